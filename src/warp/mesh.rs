//! Warp mesh for previewing the overlay
//!
//! The renderer only draws affine triangles, so the overlay is cut into a grid
//! whose vertices are pushed through the homography. Vertices land exactly on
//! the projective image; the error inside each cell shrinks with subdivision.

use super::{Homography, OverlaySize, Point};

/// Vertex for warp mesh rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpVertex {
    /// Position in container pixels
    pub position: Point,
    /// Normalized overlay texture coordinate
    pub uv: Point,
}

/// Subdivided grid covering the warped overlay
#[derive(Debug, Clone, Default)]
pub struct WarpMesh {
    /// Grid vertices, row-major, `(steps + 1)^2` of them
    pub vertices: Vec<WarpVertex>,
    /// Triangle list indexing into `vertices`
    pub indices: Vec<u32>,
}

impl WarpMesh {
    /// Build a `steps x steps` grid over the overlay rectangle.
    ///
    /// Returns `None` if any grid vertex lies on or behind the horizon
    /// (`w <= 0`). That happens for a concave quad, where one corner sits
    /// inside the triangle of the other three; triangles spanning the horizon
    /// would otherwise be drawn across the whole canvas.
    pub fn build(homography: &Homography, size: OverlaySize, steps: u32) -> Option<Self> {
        if homography.folds(size) {
            return None;
        }
        let steps = steps.max(1);
        let row = steps + 1;
        let mut vertices = Vec::with_capacity((row * row) as usize);

        for sy in 0..=steps {
            for sx in 0..=steps {
                let u = sx as f64 / steps as f64;
                let v = sy as f64 / steps as f64;
                let source = Point::new(u * size.width, v * size.height);
                let position = homography.map_point(source)?;
                vertices.push(WarpVertex {
                    position,
                    uv: Point::new(u, v),
                });
            }
        }

        let mut indices = Vec::with_capacity((steps * steps * 6) as usize);
        for sy in 0..steps {
            for sx in 0..steps {
                let i00 = sy * row + sx;
                let i10 = i00 + 1;
                let i01 = i00 + row;
                let i11 = i01 + 1;

                // Two triangles per cell
                indices.extend_from_slice(&[i00, i10, i01, i10, i11, i01]);
            }
        }

        Some(Self { vertices, indices })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
