//! Engine error taxonomy
//!
//! Every condition here is local and recoverable: the engine reports a
//! distinguishable kind to its caller and never terminates the process.
//! User-visible messaging is the caller's job.

use thiserror::Error;

/// Errors reported by the rectification and grid engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The four boundary points are collinear or enclose no area, or an
    /// operation that needs a valid rectified region was called without one
    #[error("degenerate boundary quad: no valid region")]
    DegenerateQuad,

    /// Two boundary points fell into the same angular corner slot during
    /// canonicalization (non-convex or near-degenerate input)
    #[error("ambiguous boundary points: two corners share a slot")]
    AmbiguousBounds,

    /// The homogeneous w component was too close to zero to divide by
    #[error("perspective divide with near-zero w")]
    PerspectiveDivide,

    /// A copy-offsets request included index 0, whose offset has no
    /// predecessor to be relative to
    #[error("selection includes index 0, which has no predecessor offset")]
    InvalidSelection,

    /// A selection operation referenced an index outside the axis
    #[error("index {index} out of range for axis of length {len}")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Number of entries in the axis at the time of the call
        len: usize,
    },

    /// A nearest-neighbor query arrived before any grid had been built
    #[error("proximity index is empty: no bit grid has been built")]
    EmptyIndex,

    /// A derived value (homography, bit locations, proximity index) was
    /// read after the inputs it was built from changed
    #[error("derived state is stale: built at revision {built}, inputs at {current}")]
    StaleDerivedState {
        /// Revision the derived value was built from
        built: u64,
        /// Current input revision
        current: u64,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
