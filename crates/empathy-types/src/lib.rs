//! Shared type definitions for the Empathy robot simulation.
//!
//! This crate is the single source of truth for the plain data types used
//! across the workspace: identifiers, behavioral states, arena geometry, the
//! state vector agents learn from, and the view handed to renderers.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Behavioral state and agent category
//! - [`geometry`] -- Points, rectangles, poses, and angle helpers
//! - [`state`] -- The fixed-length [`StateVector`] feature tuple
//! - [`view`] -- Render projection ([`AgentView`], [`DisplayColor`])

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod state;
pub mod view;

// Re-export all public types at crate root for convenience.
pub use enums::{BehaviorState, Category};
pub use geometry::{Point, Pose, Rect, normalize_signed_angle, wrap_heading};
pub use ids::AgentId;
pub use state::{STATE_FEATURES, StateVector};
pub use view::{AgentView, DisplayColor, VisionCone, display_color};
