//! Error types for the `empathy-world` crate.

/// Errors that can occur while building arena geometry.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Arena width or height is not a positive finite number.
    #[error("invalid arena dimensions: {width} x {height}")]
    InvalidDimensions {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// A target or dock rectangle does not fit inside the arena.
    #[error("{what} does not fit inside the arena: {reason}")]
    OutOfBounds {
        /// Which rectangle was rejected.
        what: &'static str,
        /// Description of the violation.
        reason: String,
    },

    /// No dock strip was configured, so no robot could ever finish.
    #[error("arena has no dock areas")]
    NoDocks,
}
