//! Rectification of the marked region
//!
//! Maps the boundary quad onto the normalized die space (the unit square)
//! and back, via a projective transform computed with the direct linear
//! transform method.

/// The projective transform and its point mappings
pub mod homography;

pub use homography::Homography;
