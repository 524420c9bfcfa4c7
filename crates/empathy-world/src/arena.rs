//! The arena: bounds, target zone, and dock strips.

use empathy_types::{Point, Rect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

/// Which region ends a robot's participation when its bounding box
/// overlaps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockZone {
    /// The dock strips along the target's outer edges.
    #[default]
    Docks,
    /// The whole target zone. Used when battery drain is not modeled.
    Target,
}

/// Immutable arena geometry shared by perception, decision, and kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    width: f64,
    height: f64,
    target: Rect,
    target_inset: f64,
    docks: Vec<Rect>,
    #[serde(default)]
    dock_zone: DockZone,
}

impl Arena {
    /// Build an arena from explicit geometry.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] for non-positive sizes,
    /// [`WorldError::OutOfBounds`] if the target or a dock leaves the arena,
    /// and [`WorldError::NoDocks`] if `docks` is empty.
    pub fn new(
        width: f64,
        height: f64,
        target: Rect,
        target_inset: f64,
        docks: Vec<Rect>,
    ) -> Result<Self, WorldError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        let bounds = Rect::new(0.0, 0.0, width, height);
        check_inside(&bounds, &target, "target")?;
        if docks.is_empty() {
            return Err(WorldError::NoDocks);
        }
        for dock in &docks {
            check_inside(&bounds, dock, "dock")?;
        }
        if !(target_inset.is_finite() && target_inset >= 0.0) {
            return Err(WorldError::OutOfBounds {
                what: "target inset",
                reason: format!("inset {target_inset} must be a non-negative number"),
            });
        }
        debug!(width, height, docks = docks.len(), "Arena built");
        Ok(Self {
            width,
            height,
            target,
            target_inset,
            docks,
            dock_zone: DockZone::Docks,
        })
    }

    /// The same arena with docking triggered by `zone`.
    #[must_use]
    pub const fn with_dock_zone(mut self, zone: DockZone) -> Self {
        self.dock_zone = zone;
        self
    }

    /// The region that docks a robot.
    pub const fn dock_zone(&self) -> DockZone {
        self.dock_zone
    }

    /// Build the standard layout: a square target of side `target_size` in
    /// the top-right corner, with one dock strip of `dock_thickness` along
    /// its top edge and another along its right edge.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::new`].
    pub fn corner_target(
        width: f64,
        height: f64,
        target_size: f64,
        target_inset: f64,
        dock_thickness: f64,
    ) -> Result<Self, WorldError> {
        if !(target_size > 0.0 && dock_thickness > 0.0) {
            return Err(WorldError::OutOfBounds {
                what: "target",
                reason: format!(
                    "target size {target_size} and dock thickness {dock_thickness} must be positive"
                ),
            });
        }
        let target = Rect::new(width - target_size, 0.0, target_size, target_size);
        let docks = vec![
            Rect::new(target.x, 0.0, target_size, dock_thickness),
            Rect::new(width - dock_thickness, 0.0, dock_thickness, target_size),
        ];
        Self::new(width, height, target, target_inset, docks)
    }

    /// Arena width.
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Arena height.
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// The target zone.
    pub const fn target(&self) -> &Rect {
        &self.target
    }

    /// The target zone shrunk by the configured inset, used when measuring
    /// distance to the target.
    pub fn target_core(&self) -> Rect {
        self.target.inset(self.target_inset)
    }

    /// Dock strips.
    pub fn docks(&self) -> &[Rect] {
        &self.docks
    }

    /// Whether `point` is inside the arena (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Clamp `point` into the arena.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(point.x.clamp(0.0, self.width), point.y.clamp(0.0, self.height))
    }

    /// Whether a bounding box overlaps any dock strip.
    pub fn overlaps_dock(&self, bounds: &Rect) -> bool {
        self.docks.iter().any(|dock| dock.overlaps(bounds))
    }

    /// Whether a bounding box overlaps the target zone.
    pub fn overlaps_target(&self, bounds: &Rect) -> bool {
        self.target.overlaps(bounds)
    }

    /// Whether a bounding box overlaps the active [`DockZone`].
    pub fn reaches_dock(&self, bounds: &Rect) -> bool {
        match self.dock_zone {
            DockZone::Docks => self.overlaps_dock(bounds),
            DockZone::Target => self.overlaps_target(bounds),
        }
    }
}

fn check_inside(bounds: &Rect, rect: &Rect, what: &'static str) -> Result<(), WorldError> {
    let fits = rect.width > 0.0
        && rect.height > 0.0
        && rect.x >= bounds.x
        && rect.y >= bounds.y
        && rect.right() <= bounds.right()
        && rect.bottom() <= bounds.bottom();
    if fits {
        Ok(())
    } else {
        Err(WorldError::OutOfBounds {
            what,
            reason: format!(
                "rect ({}, {}, {} x {}) outside arena {} x {}",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                bounds.width,
                bounds.height
            ),
        })
    }
}
