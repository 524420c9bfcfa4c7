//! Error types for the empathy-agents crate.
//!
//! Everything that can go wrong here is a construction-time problem: once
//! a robot exists, its knowledge base is non-empty and its battery
//! parameters are sane, so per-tick operations are infallible.

/// Errors that can occur while building robot state.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A knowledge base was requested with no prior entries. Scoring against
    /// an empty base is undefined, so this is rejected up front.
    #[error("knowledge base needs at least one prior entry")]
    EmptyKnowledge,

    /// A prior state vector had the wrong number of features.
    #[error("prior {index} has {found} features, expected {expected}")]
    FeatureCount {
        /// Position of the offending prior.
        index: usize,
        /// Required feature count.
        expected: usize,
        /// Feature count that was supplied.
        found: usize,
    },

    /// The novelty threshold is outside `(0, 1]`.
    #[error("similarity threshold {0} must be in (0, 1]")]
    InvalidThreshold(f64),

    /// Battery parameters are unusable.
    #[error("invalid battery configuration: {reason}")]
    InvalidBattery {
        /// Description of what is wrong.
        reason: String,
    },
}
