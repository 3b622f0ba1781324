use crate::models::Point;

/// Image-space line segment with ordered endpoints
///
/// Endpoint order is meaningful: for a slice line, `p1` is the image of the
/// die-space endpoint at coordinate 0 of the spanned axis and `p2` the image
/// of the endpoint at 1. The grid builder relies on this to emit rows in
/// scanline order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line {
    /// First endpoint
    pub p1: Point,
    /// Second endpoint
    pub p2: Point,
}

impl Line {
    /// Create a new segment from two endpoints
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Segment length
    pub fn length(&self) -> f64 {
        self.p1.distance(&self.p2)
    }
}
