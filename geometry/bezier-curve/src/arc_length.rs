//! Arc-length-aware segment lookup.
//!
//! Maps a curve-global normalized time `τ ∈ [0, 1]` to a segment index and a
//! segment-local time, so that equal steps in `τ` cover roughly equal
//! distances along the whole curve.
//!
//! # Algorithm
//!
//! 1. Approximate each segment's length with the same per-segment sample
//!    count, `sampling / segment_count + 1`.
//! 2. Walk the segments in order accumulating their share of the total
//!    length. The first segment whose accumulated share exceeds `τ` holds it.
//! 3. If rounding leaves `τ` past every segment, the last segment takes it.
//!
//! [`locate`] rebuilds the lengths on every call. Callers evaluating many
//! times on an unchanged curve can build an [`ArcLengthTable`] once and
//! query it instead; both give identical results.

use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::segment::CubicSegment;
use crate::{BezierError, Result};

/// Below this total length the curve is treated as collapsed.
const ZERO_LENGTH_EPSILON: f64 = 1e-12;

/// A segment index paired with a segment-local time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentLocation {
    /// Index of the segment, `0..segment_count`.
    pub segment: usize,
    /// Time local to that segment, in `[0, 1]`.
    pub local_time: f64,
}

impl SegmentLocation {
    /// Create a new location.
    #[must_use]
    pub const fn new(segment: usize, local_time: f64) -> Self {
        Self {
            segment,
            local_time,
        }
    }
}

/// Number of length samples given to each segment for a curve-wide sampling.
///
/// A `segment_count` of 0 is treated as one segment.
pub(crate) fn samples_per_segment(sampling: usize, segment_count: usize) -> usize {
    (sampling / segment_count.max(1)).saturating_add(1)
}

/// Locate normalized time `time` on the curve made of `segments`.
///
/// Lengths are recomputed on each call.
///
/// # Errors
///
/// Returns [`BezierError::InsufficientPoints`] if `segments` is empty and
/// [`BezierError::InvalidSampling`] if `sampling` is 0.
pub fn locate(segments: &[CubicSegment], sampling: usize, time: f64) -> Result<SegmentLocation> {
    Ok(ArcLengthTable::new(segments, sampling)?.locate(time))
}

/// Approximate total length of the curve made of `segments`.
///
/// An empty slice has length zero.
///
/// # Errors
///
/// Returns [`BezierError::InvalidSampling`] if `sampling` is 0.
pub fn total_length(segments: &[CubicSegment], sampling: usize) -> Result<f64> {
    if sampling == 0 {
        return Err(BezierError::InvalidSampling(sampling));
    }
    if segments.is_empty() {
        return Ok(0.0);
    }
    let samples = samples_per_segment(sampling, segments.len());
    segments
        .iter()
        .map(|segment| segment.approximate_length(samples))
        .sum()
}

/// Per-segment lengths and length fractions of a curve, computed once.
///
/// A snapshot: it does not observe later edits to the curve it was built from.
/// It serializes for inspection but is rebuilt from segments, never parsed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArcLengthTable {
    lengths: Vec<f64>,
    fractions: Vec<f64>,
    total_length: f64,
    samples_per_segment: usize,
}

impl ArcLengthTable {
    /// Measure `segments` using a curve-wide `sampling`.
    ///
    /// When the whole curve has (near) zero length every segment receives an
    /// equal fraction, so lookups degrade to uniform parametric spacing.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InsufficientPoints`] if `segments` is empty (an
    /// empty slice reports zero points) and [`BezierError::InvalidSampling`]
    /// if `sampling` is 0.
    pub fn new(segments: &[CubicSegment], sampling: usize) -> Result<Self> {
        if segments.is_empty() {
            return Err(BezierError::insufficient_points(2, 0));
        }
        if sampling == 0 {
            return Err(BezierError::InvalidSampling(sampling));
        }

        let samples = samples_per_segment(sampling, segments.len());
        let lengths = segments
            .iter()
            .map(|segment| segment.approximate_length(samples))
            .collect::<Result<Vec<_>>>()?;
        let total_length: f64 = lengths.iter().sum();

        let fractions = if total_length > ZERO_LENGTH_EPSILON {
            lengths.iter().map(|len| len / total_length).collect()
        } else {
            vec![1.0 / segments.len() as f64; segments.len()]
        };

        Ok(Self {
            lengths,
            fractions,
            total_length,
            samples_per_segment: samples,
        })
    }

    /// Number of segments measured.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.lengths.len()
    }

    /// Approximate length of the whole curve.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Approximate length of each segment.
    #[must_use]
    pub fn segment_lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Each segment's share of the total length. Sums to 1.
    #[must_use]
    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Samples used per segment.
    #[must_use]
    pub fn samples_per_segment(&self) -> usize {
        self.samples_per_segment
    }

    /// Map normalized time `time` to a segment and local time.
    ///
    /// `time` is clamped to `[0, 1]`; `0` maps to `(0, 0)` and `1` maps to
    /// `(segment_count - 1, 1)` exactly. NaN maps to the start.
    #[must_use]
    pub fn locate(&self, time: f64) -> SegmentLocation {
        let last = self.fractions.len() - 1;

        if time.is_nan() || time <= 0.0 {
            return SegmentLocation::new(0, 0.0);
        }
        if time >= 1.0 {
            return SegmentLocation::new(last, 1.0);
        }

        let mut cumulative = 0.0;
        let mut fraction = 0.0;
        for (index, &segment_fraction) in self.fractions.iter().enumerate() {
            fraction = segment_fraction;
            // cumulative <= time here, so a selected fraction is never zero
            if cumulative + fraction > time {
                let local_time = ((time - cumulative) / fraction).clamp(0.0, 1.0);
                trace!(time, segment = index, local_time, "Located segment");
                return SegmentLocation::new(index, local_time);
            }
            cumulative += fraction;
        }

        // Rounding left time past the accumulated fractions
        let start = cumulative - fraction;
        let local_time = if fraction > 0.0 {
            ((time - start) / fraction).clamp(0.0, 1.0)
        } else {
            1.0
        };
        trace!(time, segment = last, local_time, "Located past end, using last segment");
        SegmentLocation::new(last, local_time)
    }
}
