//! Parameters for curve construction.

use nalgebra::Isometry3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for a [`BezierCurve`](crate::BezierCurve).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveParams {
    /// Total sample count used for length approximation and tessellation.
    /// Must be at least 1. Default: 25
    pub sampling: usize,

    /// Transform of the curve in its host scene. New points on an empty or
    /// single-point curve are placed at its origin with its rotation.
    /// Default: identity
    pub transform: Isometry3<f64>,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            sampling: 25,
            transform: Isometry3::identity(),
        }
    }
}

impl CurveParams {
    /// Create params with a specific sampling resolution.
    ///
    /// A sampling of 0 is raised to 1.
    #[must_use]
    pub fn with_sampling(sampling: usize) -> Self {
        Self {
            sampling: sampling.max(1),
            ..Default::default()
        }
    }

    /// Cheap, coarse sampling for previews.
    #[must_use]
    pub fn coarse() -> Self {
        Self::with_sampling(8)
    }

    /// Dense sampling for accurate lengths and smooth tessellation.
    #[must_use]
    pub fn fine() -> Self {
        Self::with_sampling(100)
    }

    /// Set the host transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Isometry3<f64>) -> Self {
        self.transform = transform;
        self
    }
}
