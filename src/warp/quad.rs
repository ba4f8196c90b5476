//! Destination quadrilateral
//!
//! Four corners in fixed order (top-left, top-right, bottom-right, bottom-left)
//! in the reference container's pixel space. Corners are never reordered and
//! never hold NaN or infinite coordinates.

use serde::{Deserialize, Serialize};

use super::{Point, WarpError};

/// Named corner of the quadrilateral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Corner::TopLeft => "Top-Left",
            Corner::TopRight => "Top-Right",
            Corner::BottomRight => "Bottom-Right",
            Corner::BottomLeft => "Bottom-Left",
        }
    }
}

/// Ordered 4-corner destination shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    corners: [Point; 4],
}

impl Default for Quad {
    /// Rectangle used right after a background is chosen
    fn default() -> Self {
        Self::from_rect(Point::new(100.0, 100.0), Point::new(200.0, 400.0))
    }
}

impl Quad {
    /// Create from corners in TL, TR, BR, BL order.
    ///
    /// Non-finite corners are rejected.
    pub fn new(corners: [Point; 4]) -> Result<Self, WarpError> {
        if corners.iter().any(|c| !c.is_finite()) {
            return Err(WarpError::NonFinitePoint);
        }
        Ok(Self { corners })
    }

    /// Axis-aligned rectangle with top-left `origin`
    pub fn from_rect(origin: Point, size: Point) -> Self {
        Self {
            corners: [
                origin,
                Point::new(origin.x + size.x, origin.y),
                origin + size,
                Point::new(origin.x, origin.y + size.y),
            ],
        }
    }

    /// Rectangle of `size` centered in a container of `container` size.
    ///
    /// The rectangle is shrunk uniformly when it would not fit.
    pub fn centered(container: Point, size: Point) -> Self {
        let fit = (container.x / size.x).min(container.y / size.y).min(1.0);
        let size = if fit.is_finite() && fit > 0.0 { size * fit } else { size };
        let origin = (container - size) * 0.5;
        Self::from_rect(origin, size)
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.corners[corner.index()]
    }

    /// Replace a single corner; the other three are left untouched.
    pub fn set_corner(&mut self, index: usize, point: Point) -> Result<(), WarpError> {
        debug_assert!(index < 4, "corner index {} out of range", index);
        if index >= 4 {
            return Err(WarpError::InvalidIndex(index));
        }
        if !point.is_finite() {
            return Err(WarpError::NonFinitePoint);
        }
        self.corners[index] = point;
        Ok(())
    }

    /// Move all four corners by the same delta
    pub fn translate(&mut self, delta: Point) -> Result<(), WarpError> {
        if !delta.is_finite() {
            return Err(WarpError::NonFinitePoint);
        }
        let moved = self.corners.map(|c| c + delta);
        if moved.iter().any(|c| !c.is_finite()) {
            return Err(WarpError::NonFinitePoint);
        }
        self.corners = moved;
        Ok(())
    }

    /// Replace all four corners at once
    pub fn reset(&mut self, new: Quad) {
        *self = new;
    }

    /// Corners scaled per axis (container pixels to image pixels).
    ///
    /// Both factors must be finite and positive.
    pub fn scaled(&self, sx: f64, sy: f64) -> Result<Self, WarpError> {
        if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
            return Err(WarpError::InvalidScale(sx, sy));
        }
        let scale = Point::new(sx, sy);
        Self::new(self.corners.map(|c| c * scale))
    }

    /// Average of the four corners
    pub fn center(&self) -> Point {
        self.corners.iter().copied().sum::<Point>() / 4.0
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Point, Point) {
        let min = self.corners.iter().copied().fold(Point::splat(f64::INFINITY), Point::min);
        let max = self
            .corners
            .iter()
            .copied()
            .fold(Point::splat(f64::NEG_INFINITY), Point::max);
        (min, max)
    }

    /// Whether `point` lies inside the polygon (even-odd rule, so
    /// self-intersecting quads behave like the drawn outline)
    pub fn contains(&self, point: Point) -> bool {
        let mut inside = false;
        let mut j = 3;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[j];
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}
