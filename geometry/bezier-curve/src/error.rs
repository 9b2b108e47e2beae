//! Error types for curve operations.

use thiserror::Error;

/// Errors that can occur during curve evaluation and editing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BezierError {
    /// Not enough control points to form a segment.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points on the curve.
        actual: usize,
    },

    /// A point index is past the end of the point sequence.
    #[error("index {index} is out of range for a curve with {len} points")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of points on the curve.
        len: usize,
    },

    /// Sample counts and sampling resolutions must be at least 1.
    #[error("invalid sampling {0}: must be at least 1")]
    InvalidSampling(usize),

    /// Two control points on one curve share an id.
    #[error("duplicate point id {0}")]
    DuplicatePointId(u64),

    /// Geometry with no usable direction (e.g. a segment collapsed to a point).
    #[error("degenerate geometry: {reason}")]
    Degenerate {
        /// Description of the degeneracy.
        reason: String,
    },
}

impl BezierError {
    /// Create an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Create an out-of-range index error.
    #[must_use]
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a degenerate geometry error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    /// Check if this is an insufficient points error.
    #[must_use]
    pub fn is_insufficient_points(&self) -> bool {
        matches!(self, Self::InsufficientPoints { .. })
    }

    /// Check if this is a degenerate geometry error.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate { .. })
    }
}
