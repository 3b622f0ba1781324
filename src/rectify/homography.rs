use crate::error::{Error, Result};
use crate::models::{BoundsQuad, Point};

/// Die-space images of the four canonical corners
///
/// quad[0] maps to (0,0), quad[1] to (1,0), quad[2] to (1,1), quad[3] to
/// (0,1). Everything downstream (slice lines, scanline ordering of bit
/// locations) assumes exactly this correspondence.
const DIE_CORNERS: [Point; 4] = [
    Point { x: 0.0, y: 0.0 },
    Point { x: 1.0, y: 0.0 },
    Point { x: 1.0, y: 1.0 },
    Point { x: 0.0, y: 1.0 },
];

/// Pivot / determinant threshold below which the system counts as singular
const SINGULAR_EPS: f64 = 1e-12;

/// Projective transform between image space and die space
///
/// Holds the forward matrix (image to die) and its inverse, computed once at
/// build time. A `Homography` is immutable; when the boundary quad changes
/// the caller builds a fresh one.
#[derive(Debug, Clone, Copy)]
pub struct Homography {
    fwd: [[f64; 3]; 3],
    inv: [[f64; 3]; 3],
}

impl Homography {
    /// Compute the transform taking a boundary quad onto the unit square
    ///
    /// Solves the 8x8 direct-linear-transform system with the last matrix
    /// entry pinned to 1. Fails with [`Error::DegenerateQuad`] when the
    /// corners are collinear or otherwise make the system singular.
    pub fn from_bounds(quad: &BoundsQuad) -> Result<Self> {
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for i in 0..4 {
            let (sx, sy) = (quad.corners()[i].x, quad.corners()[i].y);
            let (dx, dy) = (DIE_CORNERS[i].x, DIE_CORNERS[i].y);

            let row = i * 2;
            a[row][0] = sx;
            a[row][1] = sy;
            a[row][2] = 1.0;
            a[row][6] = -dx * sx;
            a[row][7] = -dx * sy;
            b[row] = dx;

            a[row + 1][3] = sx;
            a[row + 1][4] = sy;
            a[row + 1][5] = 1.0;
            a[row + 1][6] = -dy * sx;
            a[row + 1][7] = -dy * sy;
            b[row + 1] = dy;
        }

        let h = solve_linear_system(&mut a, &mut b).ok_or(Error::DegenerateQuad)?;
        let fwd = [
            [h[0], h[1], h[2]],
            [h[3], h[4], h[5]],
            [h[6], h[7], 1.0],
        ];
        let inv = invert_3x3(&fwd).ok_or(Error::DegenerateQuad)?;

        Ok(Self { fwd, inv })
    }

    /// Map an image-space point into die space
    ///
    /// Applies the forward matrix homogeneously and perspective-divides.
    /// The x or y of the result is what becomes a slice offset, chosen by
    /// which axis the caller is editing.
    pub fn to_die_space(&self, p: Point) -> Result<Point> {
        apply(&self.fwd, p)
    }

    /// Map a die-space point back into image space
    pub fn to_image_space(&self, p: Point) -> Result<Point> {
        apply(&self.inv, p)
    }
}

/// Apply a 3x3 matrix to (x, y, 1) and divide through by w
fn apply(m: &[[f64; 3]; 3], p: Point) -> Result<Point> {
    let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
    let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
    let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];

    if w.abs() < SINGULAR_EPS {
        return Err(Error::PerspectiveDivide);
    }
    Ok(Point::new(x / w, y / w))
}

/// Solve an 8x8 system in place using Gaussian elimination with partial
/// pivoting; `None` when a pivot collapses
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(a: &mut [[f64; 8]; 8], b: &mut [f64; 8]) -> Option<[f64; 8]> {
    let n = 8;

    // Forward elimination
    for i in 0..n {
        let mut max_val = a[i][i].abs();
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }

        if max_val < SINGULAR_EPS {
            return None;
        }

        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    // Back substitution
    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Some(x)
}

/// Invert a 3x3 matrix via the adjugate; `None` when the determinant is
/// too small
fn invert_3x3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

    if det.abs() < SINGULAR_EPS {
        return None;
    }

    let inv_det = 1.0 / det;
    let mut inv = [[0.0f64; 3]; 3];
    inv[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
    inv[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
    inv[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
    inv[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
    inv[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
    inv[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
    inv[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
    inv[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
    inv[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;

    Some(inv)
}
