//! Planar geometry for the arena: points, axis-aligned rectangles, poses.
//!
//! Screen convention: `x` grows to the right, `y` grows downward, and
//! headings are radians measured from the +x axis toward +y.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Wrap a heading into `[0, 2π)`.
pub fn wrap_heading(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Normalize an angular difference into `(-π, π]`.
pub fn normalize_signed_angle(angle: f64) -> f64 {
    let wrapped = wrap_heading(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// A point in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows downward).
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Absolute bearing (radians, `atan2` convention) from `self` to `other`.
    pub fn bearing_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `size` centered on `center` (a robot's bounding box).
    pub fn centered_square(center: Point, size: f64) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Geometric center.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the two rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether `point` lies inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// The rectangle shrunk by `inset` on every side.
    ///
    /// Insets larger than half a side collapse that axis onto the center line.
    pub fn inset(&self, inset: f64) -> Self {
        let dx = inset.min(self.width / 2.0);
        let dy = inset.min(self.height / 2.0);
        Self::new(
            self.x + dx,
            self.y + dy,
            2.0f64.mul_add(-dx, self.width),
            2.0f64.mul_add(-dy, self.height),
        )
    }

    /// The point of this rectangle closest to `point`.
    pub fn nearest_point(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.x, self.right()),
            point.y.clamp(self.y, self.bottom()),
        )
    }
}

/// Position plus heading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Center of the robot.
    pub position: Point,
    /// Heading in radians.
    pub heading: f64,
}

impl Pose {
    /// Create a pose.
    pub const fn new(position: Point, heading: f64) -> Self {
        Self { position, heading }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn signed_angle_range() {
        assert!(approx(normalize_signed_angle(0.0), 0.0));
        assert!(approx(normalize_signed_angle(PI), PI));
        assert!(approx(normalize_signed_angle(-PI), PI));
        assert!(approx(normalize_signed_angle(3.0 * PI / 2.0), -PI / 2.0));
        assert!(approx(normalize_signed_angle(-0.25), -0.25));
        assert!(approx(normalize_signed_angle(TAU + 0.5), 0.5));
    }

    #[test]
    fn wrap_heading_stays_below_tau() {
        assert!(approx(wrap_heading(-PI / 2.0), 3.0 * PI / 2.0));
        assert!(wrap_heading(-1e-20) < TAU);
        assert!(approx(wrap_heading(TAU), 0.0));
    }

    #[test]
    fn overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 5.0, 5.0);
        let crossing = Rect::new(9.5, 9.5, 5.0, 5.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
        assert!(crossing.overlaps(&a));
    }

    #[test]
    fn nearest_point_clamps_into_rect() {
        let r = Rect::new(200.0, 0.0, 100.0, 100.0).inset(5.0);
        let p = r.nearest_point(Point::new(50.0, 150.0));
        assert!(approx(p.x, 205.0));
        assert!(approx(p.y, 95.0));
        let inside = Point::new(250.0, 50.0);
        assert_eq!(r.nearest_point(inside), inside);
    }

    #[test]
    fn centered_square_is_bounding_box() {
        let b = Rect::centered_square(Point::new(10.0, 20.0), 4.0);
        assert!(approx(b.x, 8.0));
        assert!(approx(b.bottom(), 22.0));
        assert!(b.contains(Point::new(10.0, 20.0)));
    }

    #[test]
    fn bearing_follows_screen_axes() {
        let origin = Point::new(0.0, 0.0);
        assert!(approx(origin.bearing_to(Point::new(0.0, 5.0)), PI / 2.0));
        assert!(approx(origin.distance_to(Point::new(3.0, 4.0)), 5.0));
    }
}
