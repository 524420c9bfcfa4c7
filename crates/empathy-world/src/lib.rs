//! Static arena geometry for the Empathy robot simulation.
//!
//! The arena is a fixed rectangle with its origin in the top-left corner.
//! A square target zone sits in the top-right corner and one or more thin
//! dock strips run along its outer edges. Entering a dock strip, not merely
//! the target, ends a robot's participation in a run, unless the arena is
//! built with [`DockZone::Target`].
//!
//! # Modules
//!
//! - [`arena`] -- The [`Arena`] value and its spatial queries
//! - [`error`] -- Error types for arena construction ([`WorldError`])

pub mod arena;
pub mod error;

pub use arena::{Arena, DockZone};
pub use error::WorldError;
