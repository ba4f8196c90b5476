//! Rectangle-to-quad homography
//!
//! Builds the projective map between two 4-point sets with the basis-to-points
//! construction: each point set is turned into the matrix that sends the
//! canonical projective basis onto it, and the two are chained through the
//! adjugate of the source basis.

use glam::DMat4;

use super::{OverlaySize, Point, WarpError};

/// Relative magnitude under which a basis determinant counts as zero
const SINGULAR_EPSILON: f64 = 1e-12;

/// Row-major 3x3 matrix stored flat
type Mat3 = [f64; 9];

/// A 3x3 projective transform, row-major, normalized so `m[2][2] == 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub m: [[f64; 3]; 3],
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// Homography sending the overlay's natural rectangle onto `dst`
    pub fn from_rect(size: OverlaySize, dst: &[Point; 4]) -> Result<Self, WarpError> {
        compute_projective_transform(&size.corners(), dst)
    }

    /// Homogeneous term at `p`. Positive on the side of the horizon that
    /// holds the overlay.
    pub fn homogeneous_w(&self, p: Point) -> f64 {
        let m = &self.m;
        m[2][0] * p.x + m[2][1] * p.y + m[2][2]
    }

    /// Whether any part of the `size` rectangle maps on or behind the horizon.
    ///
    /// `w` is affine in the source point, so checking the four corners covers
    /// the whole rectangle.
    pub fn folds(&self, size: OverlaySize) -> bool {
        size.corners().iter().any(|&c| self.homogeneous_w(c) <= 0.0)
    }

    /// Transform a point, dividing through by the homogeneous term.
    ///
    /// Returns `None` for points on the line at infinity.
    pub fn map_point(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
        let w = self.homogeneous_w(p);
        if w.abs() < f64::EPSILON || !w.is_finite() {
            return None;
        }
        Some(Point::new(x / w, y / w))
    }

    /// Inverse transform, or `None` when the matrix is singular
    pub fn inverse(&self) -> Option<Self> {
        let flat = self.flat();
        let det = determinant(&flat);
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let adj = adjugate(&flat);
        Some(Self::from_flat(adj.map(|e| e / det)))
    }

    /// Perspective row `(m[2][0], m[2][1])`; both zero for an affine map
    pub fn perspective_terms(&self) -> (f64, f64) {
        (self.m[2][0], self.m[2][1])
    }

    pub fn is_affine(&self, epsilon: f64) -> bool {
        let (px, py) = self.perspective_terms();
        px.abs() <= epsilon && py.abs() <= epsilon
    }

    /// 16-element column-major 4x4 matrix with z passed through unchanged.
    ///
    /// Same layout as CSS `matrix3d(...)`: apply it with the origin at the
    /// overlay's top-left corner.
    #[rustfmt::skip]
    pub fn to_matrix3d(&self) -> [f64; 16] {
        let m = &self.m;
        [
            m[0][0], m[1][0], 0.0, m[2][0],
            m[0][1], m[1][1], 0.0, m[2][1],
            0.0, 0.0, 1.0, 0.0,
            m[0][2], m[1][2], 0.0, m[2][2],
        ]
    }

    pub fn to_dmat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.to_matrix3d())
    }

    #[rustfmt::skip]
    fn flat(&self) -> Mat3 {
        let m = &self.m;
        [
            m[0][0], m[0][1], m[0][2],
            m[1][0], m[1][1], m[1][2],
            m[2][0], m[2][1], m[2][2],
        ]
    }

    fn from_flat(f: Mat3) -> Self {
        Self {
            m: [[f[0], f[1], f[2]], [f[3], f[4], f[5]], [f[6], f[7], f[8]]],
        }
    }
}

/// Compute the projective transform mapping each `src[i]` onto `dst[i]`.
///
/// Both sets must use the same winding (TL, TR, BR, BL). Fails with
/// [`WarpError::DegenerateConfiguration`] when either set is not a valid
/// projective basis or the result cannot be normalized.
pub fn compute_projective_transform(
    src: &[Point; 4],
    dst: &[Point; 4],
) -> Result<Homography, WarpError> {
    let s = basis_to_points(src)?;
    let d = basis_to_points(dst)?;
    let mut h = multiply(&d, &adjugate(&s));

    let w = h[8];
    if w == 0.0 || !w.is_finite() {
        return Err(WarpError::DegenerateConfiguration);
    }
    for e in h.iter_mut() {
        *e /= w;
    }
    if h.iter().any(|e| !e.is_finite()) {
        return Err(WarpError::DegenerateConfiguration);
    }

    Ok(Homography::from_flat(h))
}

/// Matrix sending the projective basis (e1, e2, e3, e1+e2+e3) onto `p`
fn basis_to_points(p: &[Point; 4]) -> Result<Mat3, WarpError> {
    #[rustfmt::skip]
    let m = [
        p[0].x, p[1].x, p[2].x,
        p[0].y, p[1].y, p[2].y,
        1.0, 1.0, 1.0,
    ];
    let v = multiply_vec(&adjugate(&m), [p[3].x, p[3].y, 1.0]);
    let basis = multiply(&m, &[v[0], 0.0, 0.0, 0.0, v[1], 0.0, 0.0, 0.0, v[2]]);

    let det = determinant(&basis);
    let scale = basis.iter().fold(0.0f64, |acc, e| acc.max(e.abs()));
    if !det.is_finite() || det.abs() <= SINGULAR_EPSILON * scale.powi(3) {
        return Err(WarpError::DegenerateConfiguration);
    }
    Ok(basis)
}

fn adjugate(m: &Mat3) -> Mat3 {
    [
        m[4] * m[8] - m[5] * m[7],
        m[2] * m[7] - m[1] * m[8],
        m[1] * m[5] - m[2] * m[4],
        m[5] * m[6] - m[3] * m[8],
        m[0] * m[8] - m[2] * m[6],
        m[2] * m[3] - m[0] * m[5],
        m[3] * m[7] - m[4] * m[6],
        m[1] * m[6] - m[0] * m[7],
        m[0] * m[4] - m[1] * m[3],
    ]
}

fn determinant(m: &Mat3) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
        + m[2] * (m[3] * m[7] - m[4] * m[6])
}

fn multiply(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut c = [0.0; 9];
    for i in 0..3 {
        for j in 0..3 {
            c[3 * i + j] = (0..3).map(|k| a[3 * i + k] * b[3 * k + j]).sum();
        }
    }
    c
}

fn multiply_vec(m: &Mat3, v: [f64; 3]) -> [f64; 3] {
    [
        m[0] * v[0] + m[1] * v[1] + m[2] * v[2],
        m[3] * v[0] + m[4] * v[1] + m[5] * v[2],
        m[6] * v[0] + m[7] * v[1] + m[8] * v[2],
    ]
}
