//! Perspective warp engine
//!
//! Solves the rectangle-to-quad homography, holds the destination quadrilateral,
//! and builds the subdivided mesh used to preview the warped overlay.

mod homography;
mod mesh;
mod quad;

pub use homography::{compute_projective_transform, Homography};
pub use mesh::{WarpMesh, WarpVertex};
pub use quad::{Corner, Quad};

use thiserror::Error;

/// A position in the reference container's pixel space
pub type Point = glam::DVec2;

/// Errors produced by the warp engine
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum WarpError {
    /// The points do not form a valid projective basis (three collinear, all
    /// coincident), or the homogeneous scale term vanished.
    #[error("degenerate corner configuration")]
    DegenerateConfiguration,
    /// Corner index outside 0..=3
    #[error("invalid corner index {0}")]
    InvalidIndex(usize),
    /// A coordinate or delta was NaN or infinite
    #[error("non-finite point")]
    NonFinitePoint,
    /// Part of the overlay lands behind the horizon (a concave quad)
    #[error("corners fold the overlay through the horizon")]
    FoldedQuad,
    /// A scale factor was zero, negative or non-finite, e.g. from an empty
    /// container
    #[error("invalid scale factor ({0}, {1})")]
    InvalidScale(f64, f64),
}

/// Intrinsic pixel size of the overlay image
///
/// Stays unset (0x0) until the overlay has finished loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlaySize {
    pub width: f64,
    pub height: f64,
}

impl OverlaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The unset size used before the overlay loads
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Source rectangle corners: TL, TR, BR, BL
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
    }
}

impl From<(u32, u32)> for OverlaySize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}
