use crate::error::{Error, Result};
use crate::models::Point;

/// Boundary quad in canonical cyclic order
///
/// Corner 0 is the upper-left, then clockwise: 1 upper-right, 2 lower-right,
/// 3 lower-left. The rectification homography maps these onto the die-space
/// unit square in the same order, so every consumer of a `BoundsQuad` can
/// rely on 0/1 being the top edge and 3/2 the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsQuad {
    corners: [Point; 4],
}

impl BoundsQuad {
    /// Canonicalize four arbitrary points into corner order
    ///
    /// Buckets each point by the angle of its centroid-to-point vector:
    /// angles in (−π, −π/2) go to slot 0, [−π/2, 0) to slot 1, [0, π/2) to
    /// slot 2 and [π/2, π] to slot 3. The result is clockwise from the
    /// upper-left regardless of the order the points were picked in.
    ///
    /// Fails with [`Error::AmbiguousBounds`] when two points land in the
    /// same slot, which happens for strongly non-convex or near-degenerate
    /// input.
    pub fn from_unordered(points: [Point; 4]) -> Result<Self> {
        let centroid = Point::new(
            points.iter().map(|p| p.x).sum::<f64>() / 4.0,
            points.iter().map(|p| p.y).sum::<f64>() / 4.0,
        );

        let mut corners = [None; 4];
        for point in points {
            let half_pi = std::f64::consts::FRAC_PI_2;
            let angle = (point.y - centroid.y).atan2(point.x - centroid.x);
            let slot = if angle < -half_pi {
                0
            } else if angle < 0.0 {
                1
            } else if angle < half_pi {
                2
            } else {
                3
            };

            if corners[slot].is_some() {
                return Err(Error::AmbiguousBounds);
            }
            corners[slot] = Some(point);
        }

        // All four slots are filled iff no collision occurred
        Ok(Self {
            corners: corners.map(|c| c.expect("four points fill four slots")),
        })
    }

    /// Wrap corners that are already in canonical order
    ///
    /// No reordering or validation happens here; use this for data that was
    /// canonicalized before it was stored, such as the bounds array of a
    /// description document. Canonicalization is idempotent, so passing such
    /// corners through [`BoundsQuad::from_unordered`] again is also fine.
    pub fn from_corners(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// The corners in canonical order
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Odd-even test for whether an image-space point lies inside the quad
    ///
    /// Used to gate slice placement: clicks outside the marked region are
    /// ignored rather than mapped through the homography.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        let mut j = 3;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}
