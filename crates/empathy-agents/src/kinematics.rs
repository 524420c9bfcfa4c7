//! Heading control, position integration, and contact response.
//!
//! The boundary and collision rules are deliberately simple and must stay
//! that way, since the experiments measured dynamics produced by them:
//!
//! - Leaving the arena on any axis flips the heading by π, whichever edge
//!   was crossed, before the position is clamped back inside.
//! - Two robots closer than one robot size both turn by +π/2.

use std::f64::consts::{FRAC_PI_2, PI};

use empathy_types::{Point, Pose, normalize_signed_angle, wrap_heading};
use empathy_world::Arena;
use rand::Rng;

/// Turn `heading` toward `bearing` by at most `turn_speed`.
///
/// If the remaining error is smaller than one step the heading snaps
/// exactly onto the bearing, so repeated application converges without
/// overshoot.
pub fn rotate_toward(heading: f64, bearing: f64, turn_speed: f64) -> f64 {
    let diff = normalize_signed_angle(bearing - heading);
    if diff.abs() < turn_speed {
        bearing
    } else {
        heading + turn_speed.copysign(diff)
    }
}

/// Turn `heading` to face `point` from `from`. See [`rotate_toward`].
pub fn rotate_toward_point(heading: f64, from: Point, point: Point, turn_speed: f64) -> f64 {
    rotate_toward(heading, from.bearing_to(point), turn_speed)
}

/// Random exploration: perturb the heading uniformly within `±turn_speed`.
pub fn perturb(heading: f64, turn_speed: f64, rng: &mut impl Rng) -> f64 {
    heading + rng.random_range(-turn_speed..=turn_speed)
}

/// Outcome of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Pose after the step.
    pub pose: Pose,
    /// Whether the unclamped position left the arena.
    pub bounced: bool,
}

/// Advance `pose` by `speed` along its heading and apply boundary handling.
pub fn integrate(pose: Pose, speed: f64, arena: &Arena) -> Step {
    let (sin, cos) = pose.heading.sin_cos();
    let moved = Point::new(
        speed.mul_add(cos, pose.position.x),
        speed.mul_add(sin, pose.position.y),
    );
    let bounced = !arena.contains(moved);
    let heading = if bounced {
        wrap_heading(pose.heading + PI)
    } else {
        pose.heading
    };
    Step {
        pose: Pose::new(arena.clamp(moved), heading),
        bounced,
    }
}

/// Whether two robot centers are closer than `robot_size`.
///
/// Exactly `robot_size` apart is not a collision.
pub fn colliding(a: Point, b: Point, robot_size: f64) -> bool {
    a.distance_to(b) < robot_size
}

/// Heading after a collision: a fixed +π/2 deflection.
pub fn deflect(heading: f64) -> f64 {
    wrap_heading(heading + FRAC_PI_2)
}

/// Every colliding pair `(i, j)` with `i < j`, in lexicographic order.
///
/// Only entries whose flag is `true` (active robots) take part.
pub fn collision_pairs(bodies: &[(Point, bool)], robot_size: f64) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, (a, a_active)) in bodies.iter().enumerate() {
        if !a_active {
            continue;
        }
        for (j, (b, b_active)) in bodies.iter().enumerate().skip(i.saturating_add(1)) {
            if *b_active && colliding(*a, *b, robot_size) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::TAU;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    const TURN: f64 = 0.1;

    fn arena() -> Arena {
        Arena::corner_target(300.0, 400.0, 100.0, 5.0, 5.0).unwrap()
    }

    #[test]
    fn rotate_snaps_when_within_one_step() {
        let h = rotate_toward(1.0, 1.05, TURN);
        assert!((h - 1.05).abs() < f64::EPSILON);
    }

    #[test]
    fn rotate_steps_by_turn_speed() {
        assert!((rotate_toward(0.0, 1.0, TURN) - 0.1).abs() < 1e-12);
        assert!((rotate_toward(0.0, -1.0, TURN) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn rotate_takes_short_way_around() {
        // From just below 2π toward 0.2: shortest path is counter-clockwise past 2π.
        let h = rotate_toward(TAU - 0.3, 0.2, TURN);
        assert!((h - (TAU - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn rotate_converges_monotonically_without_overshoot() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut heading = rng.random_range(-10.0..10.0);
            let bearing = rng.random_range(-PI..PI);
            let mut error = normalize_signed_angle(bearing - heading).abs();
            let mut steps = 0;
            while error > 0.0 {
                heading = rotate_toward(heading, bearing, TURN);
                let next = normalize_signed_angle(bearing - heading).abs();
                assert!(next < error, "error grew from {error} to {next}");
                error = next;
                steps += 1;
                assert!(steps <= 40, "did not converge");
            }
            assert!(normalize_signed_angle(bearing - heading).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn perturb_stays_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let h = perturb(2.0, TURN, &mut rng);
            assert!((h - 2.0).abs() <= TURN + f64::EPSILON);
        }
    }

    #[test]
    fn integrate_moves_along_heading() {
        let step = integrate(Pose::new(Point::new(50.0, 150.0), 0.0), 2.0, &arena());
        assert!(!step.bounced);
        assert!((step.pose.position.x - 52.0).abs() < 1e-12);
        assert!((step.pose.position.y - 150.0).abs() < 1e-12);
    }

    #[test]
    fn leaving_any_edge_flips_heading_and_clamps() {
        let arena = arena();
        let left = integrate(Pose::new(Point::new(1.0, 200.0), PI), 2.0, &arena);
        assert!(left.bounced);
        assert!(left.pose.position.x.abs() < f64::EPSILON);
        assert!(left.pose.heading.abs() < 1e-12);

        // Crossing the bottom edge at a shallow angle still flips by π.
        let bottom = integrate(Pose::new(Point::new(100.0, 399.5), 1.2), 2.0, &arena);
        assert!(bottom.bounced);
        assert!((bottom.pose.position.y - 400.0).abs() < f64::EPSILON);
        assert!((bottom.pose.heading - (1.2 + PI)).abs() < 1e-12);
    }

    #[test]
    fn collision_boundary_is_exclusive() {
        let size = 16.4;
        let a = Point::new(100.0, 100.0);
        assert!(colliding(a, Point::new(100.0 + size - 1.0, 100.0), size));
        assert!(!colliding(a, Point::new(100.0 + size, 100.0), size));
    }

    #[test]
    fn deflect_adds_quarter_turn() {
        assert!((deflect(0.0) - FRAC_PI_2).abs() < f64::EPSILON);
        assert!((deflect(1.0) - (1.0 + FRAC_PI_2)).abs() < f64::EPSILON);
        assert!((deflect(TAU - 0.5) - (FRAC_PI_2 - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn pairs_skip_inactive_bodies() {
        let p = Point::new(10.0, 10.0);
        let bodies = [(p, true), (p, false), (p, true), (Point::new(90.0, 90.0), true)];
        assert_eq!(collision_pairs(&bodies, 16.4), vec![(0, 2)]);
    }
}
