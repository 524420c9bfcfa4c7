//! Enumeration types for robot behavior and appearance.

use serde::{Deserialize, Serialize};

/// Behavioral state of a robot, re-evaluated once per tick.
///
/// `Docked` and `Depleted` are terminal: once entered, the robot never
/// moves again and no further transitions are possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    /// Wandering with a small random heading perturbation each tick.
    #[default]
    Exploring,
    /// The target is inside the vision cone; steering toward its center.
    SeekingTarget,
    /// Steering toward a visible peer that appears to be doing better.
    FollowingPeer,
    /// Reached a dock strip. Terminal.
    Docked,
    /// Battery exhausted. Terminal.
    Depleted,
}

impl BehaviorState {
    /// Whether this state ends the robot's participation in the run.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Docked | Self::Depleted)
    }

    /// Whether the robot still moves and takes part in collisions.
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// Visual category a robot is spawned with.
///
/// Purely cosmetic: the category only decides the render color while the
/// robot is exploring. Behavior is carried by [`BehaviorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Red robot (the default in the empathetic experiments).
    #[default]
    Red,
    /// Blue robot.
    Blue,
}
