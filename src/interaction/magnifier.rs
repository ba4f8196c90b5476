//! Magnifier geometry
//!
//! Computes where the precision lens sits and which part of the background it
//! shows. The lens floats above the dragged corner so the cursor does not hide
//! it, and shows the background scaled by `zoom` with the corner at its center.

use serde::{Deserialize, Serialize};

use crate::warp::{Point, Quad};

use super::drag::InteractionState;

/// Lens configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnifierSettings {
    /// Background scale factor inside the lens
    pub zoom: f64,
    /// Lens diameter in pixels
    pub size: f64,
    /// Extra upward gap between the corner and the lens
    pub lift: f64,
}

impl Default for MagnifierSettings {
    fn default() -> Self {
        Self {
            zoom: 3.0,
            size: 120.0,
            lift: 20.0,
        }
    }
}

/// Resolved lens placement for one frame, in container coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnifierView {
    /// Tracked point (the dragged corner)
    pub target: Point,
    /// Center of the circular lens
    pub center: Point,
    pub radius: f64,
    pub zoom: f64,
    /// Offset of the scaled background relative to the lens' top-left
    pub background_offset: Point,
    /// Size of the scaled background
    pub background_size: Point,
}

impl MagnifierView {
    pub fn new(target: Point, container_size: Point, settings: &MagnifierSettings) -> Self {
        let size = settings.size;
        let radius = size / 2.0;
        let zoom = settings.zoom;
        Self {
            target,
            center: Point::new(target.x, target.y - size / 1.5 - settings.lift),
            radius,
            zoom,
            background_offset: Point::splat(radius) - target * zoom,
            background_size: container_size * zoom,
        }
    }

    /// Top-left of the lens' square bounds
    pub fn top_left(&self) -> Point {
        self.center - Point::splat(self.radius)
    }

    /// Container point shown at `local`, a position relative to the lens'
    /// top-left corner
    pub fn source_at(&self, local: Point) -> Point {
        (local - self.background_offset) / self.zoom
    }

    /// Region of the background visible inside the lens, as (min, max)
    pub fn source_rect(&self) -> (Point, Point) {
        let diameter = Point::splat(self.radius * 2.0);
        (self.source_at(Point::ZERO), self.source_at(diameter))
    }

    /// Horizontal and vertical crosshair segments through the lens center
    pub fn crosshair(&self) -> [(Point, Point); 2] {
        let c = self.center;
        let r = self.radius;
        [
            (Point::new(c.x - r, c.y), Point::new(c.x + r, c.y)),
            (Point::new(c.x, c.y - r), Point::new(c.x, c.y + r)),
        ]
    }
}

/// Lens for the current interaction, if a corner is being dragged
pub fn magnifier_for(
    state: InteractionState,
    quad: &Quad,
    container_size: Point,
    settings: &MagnifierSettings,
) -> Option<MagnifierView> {
    match state {
        InteractionState::DraggingCorner(corner) => {
            Some(MagnifierView::new(quad.corner(corner), container_size, settings))
        }
        InteractionState::Idle | InteractionState::DraggingShape { .. } => None,
    }
}
