//! Behavior policy trait and the two policies the experiments compare.
//!
//! Each tick a robot's behavior is chosen by the first matching rule:
//!
//! 1. battery exhausted: [`Decision::Deplete`]
//! 2. bounding box overlaps the dock zone: [`Decision::Dock`]
//! 3. target center in view: [`Decision::SeekTarget`]
//! 4. a visible peer qualifies as a follow target: [`Decision::FollowPeer`]
//! 5. otherwise: [`Decision::Explore`]
//!
//! Only rule 4 differs between policies, so [`BehaviorPolicy`] asks
//! implementors for the follow target and provides the rest.

use empathy_agents::Agent;
use empathy_types::{BehaviorState, Point};

use crate::config::PolicyKind;
use crate::perception::Perceiver;

/// What a policy sees when deciding for one robot.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Perception queries for the arena.
    pub perceiver: &'a Perceiver,
    /// Every robot, in update order.
    pub agents: &'a [Agent],
    /// Index of the deciding robot in `agents`.
    pub me: usize,
    /// Robot diameter, used for the dock overlap test.
    pub robot_size: f64,
}

/// The behavior chosen for one robot this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Battery exhausted; stop for good.
    Deplete,
    /// Reached the dock zone; stop for good.
    Dock,
    /// Turn toward the target center.
    SeekTarget {
        /// Target center.
        point: Point,
    },
    /// Turn toward a peer.
    FollowPeer {
        /// Index of the followed peer.
        peer: usize,
        /// The peer's position.
        point: Point,
    },
    /// Wander with a small random heading change.
    Explore,
}

impl Decision {
    /// The behavioral state this decision puts the robot in.
    pub const fn state(&self) -> BehaviorState {
        match self {
            Self::Deplete => BehaviorState::Depleted,
            Self::Dock => BehaviorState::Docked,
            Self::SeekTarget { .. } => BehaviorState::SeekingTarget,
            Self::FollowPeer { .. } => BehaviorState::FollowingPeer,
            Self::Explore => BehaviorState::Exploring,
        }
    }
}

/// A per-robot behavior policy.
pub trait BehaviorPolicy: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// The peer to follow under rule 4, if any.
    fn follow_target(&self, ctx: &DecisionContext<'_>) -> Option<usize>;

    /// Apply the rules in priority order for robot `ctx.me`.
    ///
    /// A missing robot index decides [`Decision::Explore`].
    fn decide(&self, ctx: &DecisionContext<'_>) -> Decision {
        let Some(agent) = ctx.agents.get(ctx.me) else {
            return Decision::Explore;
        };
        if agent.battery.is_depleted() {
            return Decision::Deplete;
        }
        if ctx
            .perceiver
            .arena()
            .reaches_dock(&agent.bounds(ctx.robot_size))
        {
            return Decision::Dock;
        }
        if ctx.perceiver.sees_target(&agent.pose) {
            return Decision::SeekTarget {
                point: ctx.perceiver.arena().target().center(),
            };
        }
        self.follow_target(ctx)
            .and_then(|peer| {
                ctx.agents.get(peer).map(|followed| Decision::FollowPeer {
                    peer,
                    point: followed.pose.position,
                })
            })
            .unwrap_or(Decision::Explore)
    }
}

/// Follows the first visible peer, in array order, that is seeking the
/// target or is following and has a higher reward than the deciding robot.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmpatheticPolicy;

impl BehaviorPolicy for EmpatheticPolicy {
    fn name(&self) -> &'static str {
        "empathetic"
    }

    fn follow_target(&self, ctx: &DecisionContext<'_>) -> Option<usize> {
        let me = ctx.agents.get(ctx.me)?;
        ctx.perceiver
            .visible_peers(ctx.agents, ctx.me)
            .into_iter()
            .find(|index| {
                ctx.agents.get(*index).is_some_and(|peer| match peer.state {
                    BehaviorState::SeekingTarget => true,
                    BehaviorState::FollowingPeer => me.current_reward < peer.current_reward,
                    _ => false,
                })
            })
    }
}

/// Never follows anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfishPolicy;

impl BehaviorPolicy for SelfishPolicy {
    fn name(&self) -> &'static str {
        "selfish"
    }

    fn follow_target(&self, _ctx: &DecisionContext<'_>) -> Option<usize> {
        None
    }
}

/// The policy selected in configuration.
pub fn policy_for(kind: PolicyKind) -> Box<dyn BehaviorPolicy> {
    match kind {
        PolicyKind::Empathetic => Box::new(EmpatheticPolicy),
        PolicyKind::Selfish => Box::new(SelfishPolicy),
    }
}
