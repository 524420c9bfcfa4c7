//! One tick of the simulation loop.
//!
//! Robots are updated sequentially in array order. For each active robot:
//!
//! 1. **Battery** -- apply every decay interval that has elapsed.
//! 2. **Perception** -- observe walls, target, and peers into a state vector.
//! 3. **Knowledge** -- score the state vector (the robot's current reward),
//!    then offer it to the novelty gate.
//! 4. **Decision** -- ask the [`BehaviorPolicy`] what to do.
//! 5. **Kinematics** -- steer and move one step.
//!
//! After every robot has moved, one collision pass deflects each pair of
//! active robots that overlap.
//!
//! Array order decides every tie: the first robot to sight the target, the
//! first to dock, and the first qualifying follow target. Robots later in
//! the array observe the already-updated state of earlier ones.

use std::time::Duration;

use empathy_agents::kinematics::{self, collision_pairs, deflect};
use empathy_agents::{Agent, AgentError, MotionConfig};
use empathy_types::{AgentId, AgentView, BehaviorState, Point};
use empathy_world::WorldError;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::clock::{ClockError, WorldClock};
use crate::config::{ConfigError, SimulationConfig};
use crate::decision::{BehaviorPolicy, Decision, DecisionContext};
use crate::perception::Perceiver;
use crate::render::agent_views;
use crate::report::DockRecord;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Errors that can occur while building the initial state.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The arena could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A robot could not be spawned.
    #[error("agent error for {label}: {source}")]
    Agent {
        /// Label of the robot that failed to spawn.
        label: String,
        /// The underlying agent error.
        source: AgentError,
    },
}

/// A collision observed during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// First robot (lower array index).
    pub first: AgentId,
    /// Second robot.
    pub second: AgentId,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Robots that docked during this tick, in dock order.
    pub docked: Vec<DockRecord>,
    /// Collisions resolved during this tick.
    pub collisions: Vec<Collision>,
    /// Robots still moving at the end of the tick.
    pub active: usize,
    /// Every robot is docked.
    pub all_docked: bool,
    /// Every robot is docked or depleted.
    pub all_inactive: bool,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The tick counter.
    pub clock: WorldClock,
    /// Every robot, in update order.
    pub agents: Vec<Agent>,
    /// Perception over the arena.
    pub perceiver: Perceiver,
    /// Motion parameters shared by every robot.
    pub motion: MotionConfig,
    /// Source of exploration jitter.
    pub rng: SmallRng,
    /// First robot to sight the target, if any has.
    pub first_sighting: Option<AgentId>,
    /// Robots in the order they docked.
    pub dock_order: Vec<AgentId>,
}

impl SimulationState {
    /// Assemble a state from already-built parts.
    pub fn new(
        agents: Vec<Agent>,
        perceiver: Perceiver,
        motion: MotionConfig,
        rng: SmallRng,
    ) -> Self {
        Self {
            clock: WorldClock::new(),
            agents,
            perceiver,
            motion,
            rng,
            first_sighting: None,
            dock_order: Vec::new(),
        }
    }

    /// Validate `config`, build the arena, and spawn the population.
    ///
    /// Initial headings and exploration jitter share one generator seeded
    /// from `world.seed`, so the same config replays the same headings.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the config is invalid or a robot cannot be
    /// spawned.
    pub fn from_config(config: &SimulationConfig, now: Duration) -> Result<Self, SetupError> {
        config.validate()?;
        let arena = config.build_arena()?;
        let mut rng = SmallRng::seed_from_u64(config.world.seed);

        let mut agents = Vec::with_capacity(config.population.len());
        for spawn in &config.population {
            let agent = Agent::spawn(
                spawn,
                &config.motion,
                &config.battery,
                &config.knowledge,
                now,
                &mut rng,
            )
            .map_err(|source| SetupError::Agent {
                label: spawn.label.clone(),
                source,
            })?;
            debug!(
                agent = %agent.label,
                x = agent.pose.position.x,
                y = agent.pose.position.y,
                heading = agent.pose.heading,
                "Robot spawned"
            );
            agents.push(agent);
        }

        let perceiver = Perceiver::new(&config.vision, arena);
        Ok(Self::new(agents, perceiver, config.motion.clone(), rng))
    }

    /// Robots still moving.
    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.is_active()).count()
    }

    /// Every robot docked.
    pub fn all_docked(&self) -> bool {
        self.agents
            .iter()
            .all(|agent| agent.state == BehaviorState::Docked)
    }

    /// Drawable views of every robot.
    pub fn views(&self) -> Vec<AgentView> {
        agent_views(&self.agents, &self.perceiver, self.motion.robot_size)
    }
}

/// Execute one tick at elapsed run time `now`.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter overflows.
pub fn run_tick(
    state: &mut SimulationState,
    policy: &dyn BehaviorPolicy,
    now: Duration,
) -> Result<TickSummary, TickError> {
    let tick = state.clock.advance()?;

    let mut docked = Vec::new();
    for me in 0..state.agents.len() {
        if let Some(record) = update_agent(state, policy, me, now) {
            docked.push(record);
        }
    }

    let pairs = resolve_collisions(&mut state.agents, state.motion.robot_size);
    let mut collisions = Vec::with_capacity(pairs.len());
    for (i, j) in pairs {
        let (Some(a), Some(b)) = (state.agents.get(i), state.agents.get(j)) else {
            continue;
        };
        info!(tick, first = %a.label, second = %b.label, "Collision");
        collisions.push(Collision {
            first: a.id,
            second: b.id,
        });
    }

    let active = state.active_count();
    let summary = TickSummary {
        tick,
        docked,
        collisions,
        active,
        all_docked: state.all_docked(),
        all_inactive: active == 0,
    };
    debug!(
        tick,
        active,
        docked = summary.docked.len(),
        collisions = summary.collisions.len(),
        "Tick complete"
    );
    Ok(summary)
}

/// Deflect every pair of active robots closer than `robot_size` by +π/2
/// each. Returns the colliding index pairs.
///
/// Exactly `robot_size` apart is not a collision. A robot in several pairs
/// is deflected once per pair.
pub fn resolve_collisions(agents: &mut [Agent], robot_size: f64) -> Vec<(usize, usize)> {
    let bodies: Vec<(Point, bool)> = agents
        .iter()
        .map(|agent| (agent.pose.position, agent.is_active()))
        .collect();
    let pairs = collision_pairs(&bodies, robot_size);
    for &(i, j) in &pairs {
        for index in [i, j] {
            if let Some(agent) = agents.get_mut(index) {
                agent.pose.heading = deflect(agent.pose.heading);
            }
        }
    }
    pairs
}

/// Run steps 1-5 for robot `me`. Returns its dock record if it docked.
fn update_agent(
    state: &mut SimulationState,
    policy: &dyn BehaviorPolicy,
    me: usize,
    now: Duration,
) -> Option<DockRecord> {
    {
        let agent = state.agents.get_mut(me)?;
        if !agent.is_active() {
            return None;
        }
        if let Some(level) = agent.battery.apply_decay(now) {
            info!(agent = %agent.label, level, "Battery level changed");
        }
    }

    let observed = state.perceiver.observe(&state.agents, me)?;
    {
        let agent = state.agents.get_mut(me)?;
        agent.state_vector = observed;
        agent.current_reward = agent.knowledge.score(&observed);
        agent.knowledge.record(observed);
    }

    let decision = policy.decide(&DecisionContext {
        perceiver: &state.perceiver,
        agents: &state.agents,
        me,
        robot_size: state.motion.robot_size,
    });

    let turn_speed = state.motion.turn_speed;
    let agent = state.agents.get_mut(me)?;
    match decision {
        Decision::Deplete => {
            agent.settle(BehaviorState::Depleted);
            info!(agent = %agent.label, "Robot depleted");
            return None;
        }
        Decision::Dock => {
            agent.settle(BehaviorState::Docked);
            agent.docked_at = Some(now);
            state.dock_order.push(agent.id);
            let record = DockRecord::capture(agent, now, state.dock_order.len());
            info!(
                agent = %record.label,
                dock_time = record.dock_time.as_secs_f64(),
                rank = record.rank,
                knowledge_size = record.knowledge_size,
                skipped = record.skipped,
                skip_percentage = record.skip_percentage,
                "Robot docked"
            );
            return Some(record);
        }
        Decision::SeekTarget { point } | Decision::FollowPeer { point, .. } => {
            agent.state = decision.state();
            agent.pose.heading = kinematics::rotate_toward_point(
                agent.pose.heading,
                agent.pose.position,
                point,
                turn_speed,
            );
            if agent.state == BehaviorState::FollowingPeer {
                agent.has_followed = true;
            } else if state.first_sighting.is_none() {
                state.first_sighting = Some(agent.id);
                info!(agent = %agent.label, "First robot to sight the target");
            }
        }
        Decision::Explore => {
            agent.state = BehaviorState::Exploring;
            agent.pose.heading = kinematics::perturb(agent.pose.heading, turn_speed, &mut state.rng);
        }
    }

    if let Some(step) = agent
        .advance(state.perceiver.arena())
        .filter(|step| step.bounced)
    {
        debug!(agent = %agent.label, heading = step.pose.heading, "Bounced off the wall");
    }
    None
}
