//! Small 2D geometry helpers shared by slice hit-testing and the grid
//! builder

use crate::models::{Line, Point};

/// Parallel / zero-length tolerance
const EPS: f64 = 1e-12;

/// Distance from a point to a segment
///
/// Projects the point onto the infinite line through the segment, clamps the
/// projection parameter to [0, 1] so the foot stays on the segment, then
/// returns the Euclidean distance to that foot. Slice selection treats a
/// line as hit when this drops below a pixel threshold.
pub fn segment_point_distance(line: &Line, point: Point) -> f64 {
    let a = point.x - line.p1.x;
    let b = point.y - line.p1.y;
    let c = line.p2.x - line.p1.x;
    let d = line.p2.y - line.p1.y;

    let len_sq = c * c + d * d;
    if len_sq < EPS {
        return point.distance(&line.p1);
    }

    let param = (a * c + b * d) / len_sq;
    let foot = if param < 0.0 {
        line.p1
    } else if param > 1.0 {
        line.p2
    } else {
        Point::new(line.p1.x + param * c, line.p1.y + param * d)
    };

    point.distance(&foot)
}

/// Intersection of the infinite lines through two segments
///
/// `None` when the lines are parallel. Slice lines already span the full
/// opposite-axis extent, so the grid builder wants exactly this unbounded
/// variant.
pub fn line_intersection(a: &Line, b: &Line) -> Option<Point> {
    let (t, _) = intersection_params(a, b)?;
    Some(Point::new(
        a.p1.x + t * (a.p2.x - a.p1.x),
        a.p1.y + t * (a.p2.y - a.p1.y),
    ))
}

/// Intersection of two bounded segments
///
/// `None` when the lines are parallel or the crossing falls outside either
/// segment.
pub fn segment_intersection(a: &Line, b: &Line) -> Option<Point> {
    let (t, u) = intersection_params(a, b)?;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(Point::new(
        a.p1.x + t * (a.p2.x - a.p1.x),
        a.p1.y + t * (a.p2.y - a.p1.y),
    ))
}

/// Line parameters (t along `a`, u along `b`) of the crossing point
fn intersection_params(a: &Line, b: &Line) -> Option<(f64, f64)> {
    let d1x = a.p2.x - a.p1.x;
    let d1y = a.p2.y - a.p1.y;
    let d2x = b.p2.x - b.p1.x;
    let d2y = b.p2.y - b.p1.y;

    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() < EPS {
        return None;
    }

    let ox = b.p1.x - a.p1.x;
    let oy = b.p1.y - a.p1.y;
    let t = (ox * d2y - oy * d2x) / denom;
    let u = (ox * d1y - oy * d1x) / denom;
    Some((t, u))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment_interior() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let d = segment_point_distance(&line, Point::new(5.0, 3.0));
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_clamps_to_endpoints() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let d = segment_point_distance(&line, Point::new(13.0, 4.0));
        // Past p2, so the distance is to p2 itself
        assert!((d - 5.0).abs() < 1e-12);

        let d = segment_point_distance(&line, Point::new(-3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_zero_length_segment() {
        let line = Line::new(Point::new(2.0, 2.0), Point::new(2.0, 2.0));
        let d = segment_point_distance(&line, Point::new(5.0, 6.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_infinite_lines_cross_beyond_segment_ends() {
        // Segments that do not touch, but whose lines cross at (5, 5)
        let a = Line::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let b = Line::new(Point::new(10.0, 0.0), Point::new(9.0, 1.0));

        let p = line_intersection(&a, &b).unwrap();
        assert!((p.x - 5.0).abs() < 1e-12 && (p.y - 5.0).abs() < 1e-12);
        assert!(segment_intersection(&a, &b).is_none());
    }

    #[test]
    fn test_segments_crossing() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Line::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        let p = segment_intersection(&a, &b).unwrap();
        assert!((p.x - 5.0).abs() < 1e-12 && (p.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let b = Line::new(Point::new(0.0, 1.0), Point::new(10.0, 1.0));
        assert!(line_intersection(&a, &b).is_none());
    }
}
