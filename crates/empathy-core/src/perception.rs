//! Vision-cone sensing for the perception phase of a tick.
//!
//! A robot senses through a cone centered on its heading: everything within
//! `view_distance` whose bearing lies within half the view angle of the
//! heading is visible. From that the [`Perceiver`] derives the six state
//! features fed to the knowledge store:
//!
//! 1. battery (taken from the robot itself),
//! 2. wall danger from three rays cast along the cone edges and center,
//! 3. target proximity,
//! 4. fraction of peers in view,
//! 5. proximity to the nearest visible peer seeking the target,
//! 6. proximity to the nearest visible peer following another robot.
//!
//! Proximity signals are `1 - distance / view_distance` inside the radius
//! and 0 outside. Every query is a pure function of the poses passed in.

use std::f64::consts::{FRAC_PI_2, PI};

use empathy_agents::Agent;
use empathy_types::{
    BehaviorState, Point, Pose, StateVector, VisionCone, normalize_signed_angle, wrap_heading,
};
use empathy_world::Arena;

use crate::config::VisionConfig;

/// Floating-point allowance on the cone edge, in radians. Covers the few
/// ULPs `atan2` and the coordinate subtraction lose, so a bearing of exactly
/// half the view angle is visible. Any real overshoot is far larger.
pub const CONE_TOLERANCE: f64 = 1e-12;

/// Direction components smaller than this never reach the edge they face.
const AXIS_EPSILON: f64 = 1e-9;

const THREE_HALVES_PI: f64 = PI + FRAC_PI_2;

/// Perception queries over one arena with fixed vision parameters.
#[derive(Debug, Clone)]
pub struct Perceiver {
    view_distance: f64,
    half_angle: f64,
    arena: Arena,
}

impl Perceiver {
    /// Create a perceiver for `arena` with the given vision parameters.
    pub fn new(vision: &VisionConfig, arena: Arena) -> Self {
        Self {
            view_distance: vision.view_distance,
            half_angle: vision.half_angle(),
            arena,
        }
    }

    /// Maximum sensing radius.
    pub const fn view_distance(&self) -> f64 {
        self.view_distance
    }

    /// Half the cone angle, in radians.
    pub const fn half_angle(&self) -> f64 {
        self.half_angle
    }

    /// The arena being sensed.
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Whether `point` lies inside the vision cone of `pose`.
    ///
    /// Both limits are inclusive. The angular limit carries the
    /// [`CONE_TOLERANCE`] rounding allowance and nothing more, so a bearing
    /// measurably past half the view angle is outside.
    pub fn in_cone(&self, pose: &Pose, point: Point) -> bool {
        if pose.position.distance_to(point) > self.view_distance {
            return false;
        }
        let off_axis = normalize_signed_angle(pose.position.bearing_to(point) - pose.heading);
        off_axis.abs() <= self.half_angle + CONE_TOLERANCE
    }

    /// Indices of every other robot inside the cone of robot `me`, in
    /// array order.
    pub fn visible_peers(&self, agents: &[Agent], me: usize) -> Vec<usize> {
        let Some(viewer) = agents.get(me) else {
            return Vec::new();
        };
        agents
            .iter()
            .enumerate()
            .filter(|(index, peer)| {
                *index != me && self.in_cone(&viewer.pose, peer.pose.position)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether the target's center is inside the cone of `pose`.
    pub fn sees_target(&self, pose: &Pose) -> bool {
        self.in_cone(pose, self.arena.target().center())
    }

    /// The closest visible peer in `state`, with its distance.
    ///
    /// When no such peer is closer than `view_distance` the result is
    /// `(None, view_distance)`.
    pub fn nearest_of_category(
        &self,
        agents: &[Agent],
        me: usize,
        state: BehaviorState,
    ) -> (Option<usize>, f64) {
        let Some(viewer) = agents.get(me) else {
            return (None, self.view_distance);
        };
        let mut nearest = None;
        let mut nearest_distance = self.view_distance;
        for index in self.visible_peers(agents, me) {
            let Some(peer) = agents.get(index) else {
                continue;
            };
            if peer.state != state {
                continue;
            }
            let distance = viewer.pose.position.distance_to(peer.pose.position);
            if distance < nearest_distance {
                nearest = Some(index);
                nearest_distance = distance;
            }
        }
        (nearest, nearest_distance)
    }

    /// Wall danger in `[0, 1]`: the shortest of three rays cast along the
    /// cone edges and center, as a proximity signal.
    pub fn distance_to_wall(&self, pose: &Pose) -> f64 {
        let nearest = [-self.half_angle, 0.0, self.half_angle]
            .into_iter()
            .map(|offset| self.ray_length(pose.position, pose.heading + offset))
            .fold(f64::INFINITY, f64::min);
        self.proximity(nearest)
    }

    /// Target proximity in `[0, 1]`, measured to the nearest point of the
    /// inset target.
    pub fn distance_to_target(&self, position: Point) -> f64 {
        let nearest = self.arena.target_core().nearest_point(position);
        self.proximity(position.distance_to(nearest))
    }

    /// Fraction of the other robots inside the cone of robot `me`.
    #[allow(clippy::cast_precision_loss)]
    pub fn visible_fraction(&self, agents: &[Agent], me: usize) -> f64 {
        let others = agents.len().saturating_sub(1);
        if others == 0 {
            return 0.0;
        }
        self.visible_peers(agents, me).len() as f64 / others as f64
    }

    /// Assemble the state vector for robot `me`.
    ///
    /// Wall, target, visible-fraction, and seeking-peer features are rounded
    /// to two decimals; the following-peer feature is not.
    pub fn observe(&self, agents: &[Agent], me: usize) -> Option<StateVector> {
        let viewer = agents.get(me)?;
        let pose = &viewer.pose;

        let seeking = match self.nearest_of_category(agents, me, BehaviorState::SeekingTarget) {
            (Some(_), distance) => round2(self.proximity(distance)),
            (None, _) => 0.0,
        };
        let following = match self.nearest_of_category(agents, me, BehaviorState::FollowingPeer) {
            (Some(_), distance) => self.proximity(distance),
            (None, _) => 0.0,
        };

        Some(StateVector::new(
            viewer.battery.state_feature(),
            round2(self.distance_to_wall(pose)),
            round2(self.distance_to_target(pose.position)),
            round2(self.visible_fraction(agents, me)),
            seeking,
            following,
        ))
    }

    /// The cone outline for rendering.
    pub fn vision_cone(&self, pose: &Pose) -> VisionCone {
        VisionCone {
            start_angle: pose.heading - self.half_angle,
            end_angle: pose.heading + self.half_angle,
            radius: self.view_distance,
        }
    }

    fn proximity(&self, distance: f64) -> f64 {
        if distance < self.view_distance {
            1.0 - distance / self.view_distance
        } else {
            0.0
        }
    }

    /// Distance from `origin` along `angle` to the first arena edge.
    ///
    /// Each quadrant faces one vertical and one horizontal edge. A direction
    /// that runs parallel to one of them only hits the other.
    fn ray_length(&self, origin: Point, angle: f64) -> f64 {
        let angle = wrap_heading(angle);
        let (sin, cos) = angle.sin_cos();
        let right = self.arena.width() - origin.x;
        let down = self.arena.height() - origin.y;

        let (vertical, horizontal) = if angle < FRAC_PI_2 {
            (edge_hit(right, cos), edge_hit(down, sin))
        } else if angle < PI {
            (edge_hit(origin.x, -cos), edge_hit(down, sin))
        } else if angle < THREE_HALVES_PI {
            (edge_hit(origin.x, -cos), edge_hit(origin.y, -sin))
        } else {
            (edge_hit(right, cos), edge_hit(origin.y, -sin))
        };

        match (vertical, horizontal) {
            (Some(a), Some(b)) => a.min(b),
            (Some(hit), None) | (None, Some(hit)) => hit,
            (None, None) => f64::INFINITY,
        }
    }
}

fn edge_hit(gap: f64, component: f64) -> Option<f64> {
    (component > AXIS_EPSILON).then(|| gap.max(0.0) / component)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
