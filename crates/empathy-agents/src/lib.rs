//! Robot state, learning, and motion for the Empathy robot simulation.
//!
//! This crate contains the logic layer for individual robots -- everything
//! that operates on one robot's state without looking at the rest of the
//! swarm. It sits between `empathy-types` (plain data) and `empathy-core`
//! (perception, decision policy, and the tick loop).
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] record and spawn parameters
//! - [`battery`] -- Wall-clock driven battery decay ([`Battery`])
//! - [`config`] -- Tunables for motion, battery, and knowledge
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`kinematics`] -- Heading control, integration, boundary and collision response
//! - [`knowledge`] -- Fuzzy-similarity reward memory ([`KnowledgeBase`])

pub mod agent;
pub mod battery;
pub mod config;
pub mod error;
pub mod kinematics;
pub mod knowledge;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentSpawn};
pub use battery::Battery;
pub use config::{BatteryConfig, KnowledgeConfig, MotionConfig, PriorConfig};
pub use error::AgentError;
pub use knowledge::{KnowledgeBase, KnowledgeEntry, RecordOutcome, reference_priors, similarity};
