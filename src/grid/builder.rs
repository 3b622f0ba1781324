//! Derivation of image-space slice lines and bit locations
//!
//! Everything here is a pure function of the homography, the boundary quad
//! and the slice axes, except that bit-location derivation sorts both axes
//! ascending as a side effect (the stored order is the sorted order from
//! then on).

use crate::error::{Error, Result};
use crate::grid::{Orientation, SliceAxis};
use crate::models::{BoundsQuad, Line, Point};
use crate::rectify::Homography;
use crate::utils::geometry::line_intersection;

/// Image-space line for a single slice offset
///
/// The die-space segment spans the full [0, 1] extent of the other axis at
/// the given offset; both endpoints go through the inverse homography. `p1`
/// is the image of the 0 end, `p2` of the 1 end.
pub fn slice_line(h: &Homography, offset: f64, orientation: Orientation) -> Result<Line> {
    let (start, end) = match orientation {
        Orientation::Horizontal => (Point::new(offset, 0.0), Point::new(offset, 1.0)),
        Orientation::Vertical => (Point::new(0.0, offset), Point::new(1.0, offset)),
    };
    Ok(Line::new(h.to_image_space(start)?, h.to_image_space(end)?))
}

/// Image-space lines for every offset of one axis, in stored order
pub fn build_lines(
    axis: &SliceAxis,
    h: &Homography,
    orientation: Orientation,
) -> Result<Vec<Line>> {
    axis.values()
        .iter()
        .map(|&offset| slice_line(h, offset, orientation))
        .collect()
}

/// All bit locations in scanline order (top row first, left to right)
///
/// Sorts both axes ascending first — a mutation of their stored order — so
/// rows and columns come out monotone. Every row holds
/// `horiz.len() + 2` points and there are `vert.len() + 2` rows: the
/// boundary corners and slice-line endpoints frame the interior
/// intersections. Scanline order relies on corners 0/1 being the top edge.
pub fn build_bit_locations(
    quad: &BoundsQuad,
    horiz: &mut SliceAxis,
    vert: &mut SliceAxis,
    h: &Homography,
) -> Result<Vec<Point>> {
    horiz.sort_ascending();
    vert.sort_ascending();

    let h_lines = build_lines(horiz, h, Orientation::Horizontal)?;
    let v_lines = build_lines(vert, h, Orientation::Vertical)?;

    let corners = quad.corners();
    let mut points = Vec::with_capacity((h_lines.len() + 2) * (v_lines.len() + 2));

    // Top row: upper-left corner, top endpoints, upper-right corner
    points.push(corners[0]);
    for line in &h_lines {
        points.push(line.p1);
    }
    points.push(corners[1]);

    // Interior rows, one per vertical slice
    for v_line in &v_lines {
        points.push(v_line.p1);
        for h_line in &h_lines {
            let crossing = line_intersection(h_line, v_line).ok_or(Error::DegenerateQuad)?;
            points.push(crossing);
        }
        points.push(v_line.p2);
    }

    // Bottom row: lower-left corner, bottom endpoints, lower-right corner
    points.push(corners[3]);
    for line in &h_lines {
        points.push(line.p2);
    }
    points.push(corners[2]);

    Ok(points)
}
