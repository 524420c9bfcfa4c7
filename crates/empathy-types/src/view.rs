//! Render projection of robot state.
//!
//! Behavior is never stored as a color. Renderers derive colors from the
//! explicit [`BehaviorState`] through [`display_color`].

use serde::{Deserialize, Serialize};

use crate::enums::{BehaviorState, Category};
use crate::geometry::Pose;
use crate::ids::AgentId;

/// An RGB color for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl DisplayColor {
    /// Pure red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Pure green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Pure blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Neutral gray for inactive robots.
    pub const GRAY: Self = Self::rgb(169, 169, 169);

    /// Build a color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Color a robot is drawn with for its current state.
pub const fn display_color(state: BehaviorState, category: Category) -> DisplayColor {
    match state {
        BehaviorState::Docked | BehaviorState::Depleted => DisplayColor::GRAY,
        BehaviorState::SeekingTarget => DisplayColor::GREEN,
        BehaviorState::FollowingPeer => DisplayColor::BLUE,
        BehaviorState::Exploring => match category {
            Category::Red => DisplayColor::RED,
            Category::Blue => DisplayColor::BLUE,
        },
    }
}

/// The vision cone to draw around a robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionCone {
    /// Start angle of the sector (heading minus half the view angle).
    pub start_angle: f64,
    /// End angle of the sector (heading plus half the view angle).
    pub end_angle: f64,
    /// Sector radius (the view distance).
    pub radius: f64,
}

/// Everything a renderer needs to draw one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    /// Robot identifier.
    pub id: AgentId,
    /// Human-readable label.
    pub label: String,
    /// Current pose.
    pub pose: Pose,
    /// Diameter of the drawn disc.
    pub size: f64,
    /// Current behavioral state.
    pub state: BehaviorState,
    /// Projected draw color.
    pub color: DisplayColor,
    /// Vision cone outline.
    pub cone: VisionCone,
}
