//! The robot record.
//!
//! An [`Agent`] is created once per run and mutated every tick until it
//! docks or its battery runs out. Peers only ever read each other's public
//! fields; a robot's own tick is the only place its fields change.

use std::f64::consts::TAU;
use std::time::Duration;

use empathy_types::{AgentId, BehaviorState, Category, Point, Pose, Rect, StateVector};
use empathy_world::Arena;
use rand::Rng;
use serde::Deserialize;

use crate::battery::Battery;
use crate::config::{BatteryConfig, KnowledgeConfig, MotionConfig};
use crate::error::AgentError;
use crate::kinematics::{self, Step};
use crate::knowledge::KnowledgeBase;

/// Where and how a robot enters the arena, as listed in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentSpawn {
    /// Human-readable label used in reports (`"A"`, `"B"`, ...).
    pub label: String,
    /// Starting x coordinate.
    pub x: f64,
    /// Starting y coordinate.
    pub y: f64,
    /// Render category.
    #[serde(default)]
    pub category: Category,
}

/// A robot in the arena.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Identifier.
    pub id: AgentId,
    /// Report label.
    pub label: String,
    /// Render category.
    pub category: Category,
    /// Position and heading.
    pub pose: Pose,
    /// Current linear speed; zero once terminal.
    pub speed: f64,
    /// Behavioral state chosen this tick.
    pub state: BehaviorState,
    /// Battery.
    pub battery: Battery,
    /// State vector computed from the latest perception.
    pub state_vector: StateVector,
    /// Reward the knowledge base assigns to `state_vector`.
    pub current_reward: f64,
    /// Reward memory.
    pub knowledge: KnowledgeBase,
    /// Set the first time the robot follows a peer.
    pub has_followed: bool,
    /// Elapsed run time at which the robot docked.
    pub docked_at: Option<Duration>,
}

impl Agent {
    /// Create a robot with a uniformly random initial heading.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the battery or knowledge configuration is
    /// invalid.
    pub fn spawn(
        spawn: &AgentSpawn,
        motion: &MotionConfig,
        battery: &BatteryConfig,
        knowledge: &KnowledgeConfig,
        now: Duration,
        rng: &mut impl Rng,
    ) -> Result<Self, AgentError> {
        let heading = rng.random_range(0.0..TAU);
        Ok(Self {
            id: AgentId::new(),
            label: spawn.label.clone(),
            category: spawn.category,
            pose: Pose::new(Point::new(spawn.x, spawn.y), heading),
            speed: motion.speed,
            state: BehaviorState::Exploring,
            battery: Battery::new(battery, now)?,
            state_vector: StateVector::default(),
            current_reward: 0.0,
            knowledge: KnowledgeBase::from_config(knowledge)?,
            has_followed: false,
            docked_at: None,
        })
    }

    /// Whether the robot still moves.
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Axis-aligned bounding box of the robot.
    pub fn bounds(&self, robot_size: f64) -> Rect {
        Rect::centered_square(self.pose.position, robot_size)
    }

    /// Enter a terminal state: speed drops to zero for good.
    pub const fn settle(&mut self, state: BehaviorState) {
        self.state = state;
        self.speed = 0.0;
    }

    /// Move one step along the current heading. Terminal robots do not move.
    pub fn advance(&mut self, arena: &Arena) -> Option<Step> {
        if !self.is_active() {
            return None;
        }
        let step = kinematics::integrate(self.pose, self.speed, arena);
        self.pose = step.pose;
        Some(step)
    }
}
