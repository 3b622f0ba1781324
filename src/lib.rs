//! die_grid - Quadrilateral rectification and bit-grid engine
//!
//! Marks bit locations on die photographs: an operator picks four boundary
//! points around a roughly rectangular region, the engine rectifies that
//! region onto a normalized unit square via a projective transform, slice
//! offsets along both die axes carve the region into a grid, and every grid
//! intersection becomes an image-space bit location with fast
//! nearest-neighbor lookup.
//!
//! The crate is UI-free. Rendering, event capture and file dialogs live in
//! a host application that feeds plain values into a [`MarkingSession`] and
//! pulls owned snapshots back out.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Error taxonomy shared across the engine
pub mod error;
/// Bit-strip image export with bilinear sampling
pub mod export;
/// Slice axes and grid derivation
pub mod grid;
/// Core data structures (points, segments, boundary quad, description file)
pub mod models;
/// Projective rectification between image space and die space
pub mod rectify;
/// The session object owning all engine state
pub mod session;
/// Geometry helpers and the nearest-neighbor index
pub mod utils;

pub use error::Error;
pub use grid::{Orientation, SliceAxis};
pub use models::{BoundsQuad, DescriptionError, DieDescription, Line, Point};
pub use rectify::Homography;
pub use session::{
    DEFAULT_POINT_PICK_RADIUS, DEFAULT_SLICE_PICK_DISTANCE, MarkingSession, SliceLine,
};
