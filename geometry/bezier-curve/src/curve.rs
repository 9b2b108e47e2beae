//! Piecewise cubic Bézier curve made of owned control points.

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arc_length::{self, ArcLengthTable, SegmentLocation};
use crate::frame::Frame;
use crate::params::CurveParams;
use crate::point::{ControlPoint, PointId};
use crate::segment::CubicSegment;
use crate::{BezierError, Result};

/// Below this distance two points give no direction to extrapolate along.
const EXTRAPOLATION_EPSILON: f64 = 1e-10;

/// A composite curve through an ordered sequence of control points.
///
/// Segment `i` runs from point `i` to point `i + 1`, shaped by the right
/// handle of the first and the left handle of the second. Evaluation is
/// addressed by a single normalized time `τ ∈ [0, 1]` spanning the whole
/// curve, spaced approximately uniformly by arc length.
///
/// The curve exclusively owns its points; removing a point drops it.
///
/// # Example
///
/// ```
/// use bezier_curve::BezierCurve;
/// use nalgebra::{Point3, Vector3};
///
/// let mut curve = BezierCurve::new();
/// curve.append_point().set_position(Point3::new(0.0, 0.0, 0.0));
/// curve.append_point().set_position(Point3::new(4.0, 0.0, 0.0));
///
/// let mid = curve.point_at(0.5).unwrap();
/// assert!((mid.x - 2.0).abs() < 1e-9);
///
/// let frame = curve.frame_at(0.5, &Vector3::y()).unwrap();
/// assert!(frame.is_orthonormal(1e-9));
/// ```
///
/// Deserialization rejects a sampling of 0 and duplicate point ids, and moves
/// the id counter past every stored id.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "CurveRecord")
)]
pub struct BezierCurve {
    points: Vec<ControlPoint>,
    sampling: usize,
    transform: Isometry3<f64>,
    next_id: u64,
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self::new()
    }
}

impl BezierCurve {
    /// Create an empty curve with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(CurveParams::default())
    }

    /// Create an empty curve from parameters. A sampling of 0 is raised to 1.
    #[must_use]
    pub fn with_params(params: CurveParams) -> Self {
        Self {
            points: Vec::new(),
            sampling: params.sampling.max(1),
            transform: params.transform,
            next_id: 0,
        }
    }

    /// Sampling resolution for length approximation and tessellation.
    #[must_use]
    pub fn sampling(&self) -> usize {
        self.sampling
    }

    /// Change the sampling resolution.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InvalidSampling`] if `sampling` is 0.
    pub fn set_sampling(&mut self, sampling: usize) -> Result<()> {
        if sampling == 0 {
            return Err(BezierError::InvalidSampling(sampling));
        }
        debug!(from = self.sampling, to = sampling, "Changed curve sampling");
        self.sampling = sampling;
        Ok(())
    }

    /// Transform of the curve in its host scene.
    #[must_use]
    pub fn transform(&self) -> Isometry3<f64> {
        self.transform
    }

    /// Change the host transform. Point positions are world-space and stay put.
    pub fn set_transform(&mut self, transform: Isometry3<f64>) {
        self.transform = transform;
    }

    /// The control points in curve order.
    #[must_use]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Number of control points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Check if the curve has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the point at `index`.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    /// Get the point at `index` for editing.
    pub fn point_mut(&mut self, index: usize) -> Option<&mut ControlPoint> {
        self.points.get_mut(index)
    }

    /// Position of the point with identity `id` in the sequence.
    #[must_use]
    pub fn index_of(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id() == id)
    }

    /// Get the point with identity `id`.
    #[must_use]
    pub fn point_by_id(&self, id: PointId) -> Option<&ControlPoint> {
        self.points.iter().find(|p| p.id() == id)
    }

    /// Get the point with identity `id` for editing.
    pub fn point_by_id_mut(&mut self, id: PointId) -> Option<&mut ControlPoint> {
        self.points.iter_mut().find(|p| p.id() == id)
    }

    /// Position of the point at `index` relative to the curve transform.
    #[must_use]
    pub fn local_position(&self, index: usize) -> Option<Point3<f64>> {
        self.points
            .get(index)
            .map(|p| self.transform.inverse_transform_point(&p.position()))
    }

    /// Place the point at `index` relative to the curve transform.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::IndexOutOfRange`] if there is no such point.
    pub fn set_local_position(&mut self, index: usize, local: Point3<f64>) -> Result<()> {
        let world = self.transform * local;
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or_else(|| BezierError::index_out_of_range(index, len))?;
        point.set_position(world);
        Ok(())
    }

    /// Number of segments, one fewer than the number of points.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// The segment starting at point `index`.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<CubicSegment> {
        let start = self.points.get(index)?;
        let end = self.points.get(index + 1)?;
        Some(CubicSegment::new(
            start.position(),
            start.right_handle_position(),
            end.left_handle_position(),
            end.position(),
        ))
    }

    /// All segments in curve order.
    #[must_use]
    pub fn segments(&self) -> Vec<CubicSegment> {
        (0..self.segment_count())
            .filter_map(|i| self.segment(i))
            .collect()
    }

    /// Add a point at the end of the curve.
    ///
    /// See [`Self::insert_point_at`] for placement.
    pub fn append_point(&mut self) -> &mut ControlPoint {
        let index = self.points.len();
        self.insert_unchecked(index)
    }

    /// Insert a new point at `index` and return it.
    ///
    /// Placement:
    /// - on a curve with 0 or 1 points, at the curve transform's origin
    /// - at index 0, one unit before the first point, away from the second
    /// - at the end, one unit past the last point, away from the one before
    /// - otherwise, at the middle (`t = 0.5`) of the segment being split
    ///
    /// The new point takes the curve's rotation and default handles.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::IndexOutOfRange`] if `index` is past the end.
    pub fn insert_point_at(&mut self, index: usize) -> Result<&mut ControlPoint> {
        if index > self.points.len() {
            return Err(BezierError::index_out_of_range(index, self.points.len()));
        }
        Ok(self.insert_unchecked(index))
    }

    fn insert_unchecked(&mut self, index: usize) -> &mut ControlPoint {
        let position = self.placement_for(index);
        let id = PointId(self.next_id);
        self.next_id += 1;

        self.points
            .insert(index, ControlPoint::new(id, position, self.transform.rotation));
        debug!(
            index,
            id = id.get(),
            count = self.points.len(),
            "Inserted control point"
        );
        &mut self.points[index]
    }

    fn placement_for(&self, index: usize) -> Point3<f64> {
        let len = self.points.len();
        if len < 2 {
            return self.transform * Point3::origin();
        }

        if index == 0 {
            extrapolate(self.points[0].position(), self.points[1].position())
        } else if index == len {
            extrapolate(self.points[len - 1].position(), self.points[len - 2].position())
        } else {
            self.segment(index - 1)
                .map_or_else(|| self.points[index].position(), |s| s.point_at(0.5))
        }
    }

    /// Remove and drop the point at `index`.
    ///
    /// Returns `false`, leaving the curve untouched, if the removal would leave
    /// fewer than two points or `index` is past the end.
    pub fn remove_point_at(&mut self, index: usize) -> bool {
        let len = self.points.len();
        if index >= len {
            debug!(index, count = len, "Declined removal of missing point");
            return false;
        }
        if len <= 2 {
            debug!(index, count = len, "Declined removal below two points");
            return false;
        }

        let removed = self.points.remove(index);
        debug!(
            index,
            id = removed.id().get(),
            count = self.points.len(),
            "Removed control point"
        );
        true
    }

    fn require_segments(&self) -> Result<Vec<CubicSegment>> {
        if self.points.len() < 2 {
            return Err(BezierError::insufficient_points(2, self.points.len()));
        }
        Ok(self.segments())
    }

    /// Map normalized time `time` to a segment and local time.
    ///
    /// Segment lengths are recomputed on every call; see
    /// [`Self::arc_length_table`] for repeated lookups.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InsufficientPoints`] with fewer than two points.
    pub fn locate(&self, time: f64) -> Result<SegmentLocation> {
        let segments = self.require_segments()?;
        arc_length::locate(&segments, self.sampling, time)
    }

    /// Measure the curve once for repeated lookups.
    ///
    /// The table is a snapshot; rebuild it after editing points or sampling.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InsufficientPoints`] with fewer than two points.
    pub fn arc_length_table(&self) -> Result<ArcLengthTable> {
        let segments = self.require_segments()?;
        ArcLengthTable::new(&segments, self.sampling)
    }

    fn segment_and_time(&self, time: f64) -> Result<(CubicSegment, f64)> {
        let segments = self.require_segments()?;
        let location = arc_length::locate(&segments, self.sampling, time)?;
        let segment = segments
            .get(location.segment)
            .copied()
            .ok_or_else(|| BezierError::index_out_of_range(location.segment, segments.len()))?;
        Ok((segment, location.local_time))
    }

    /// Like [`Self::segment_and_time`], but a collapsed segment hands over to
    /// the nearest non-collapsed one at the joint they share.
    ///
    /// The time mapping only lands on a collapsed segment at the curve ends
    /// (or anywhere on a curve of zero length), where it has no direction.
    fn direction_segment_and_time(&self, time: f64) -> Result<(CubicSegment, f64)> {
        let segments = self.require_segments()?;
        let location = arc_length::locate(&segments, self.sampling, time)?;
        let index = location.segment;
        let segment = segments
            .get(index)
            .copied()
            .ok_or_else(|| BezierError::index_out_of_range(index, segments.len()))?;
        if !segment.is_collapsed() {
            return Ok((segment, location.local_time));
        }

        let after = segments[index + 1..]
            .iter()
            .find(|s| !s.is_collapsed())
            .map(|s| (*s, 0.0));
        let before = segments[..index]
            .iter()
            .rev()
            .find(|s| !s.is_collapsed())
            .map(|s| (*s, 1.0));
        let neighbour = if location.local_time < 0.5 {
            before.or(after)
        } else {
            after.or(before)
        };

        match neighbour {
            Some((neighbour, t)) => {
                trace!(time, segment = index, t, "Collapsed segment, using neighbour");
                Ok((neighbour, t))
            }
            None => Ok((segment, location.local_time)),
        }
    }

    /// Position at normalized time `time`.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InsufficientPoints`] with fewer than two points.
    pub fn point_at(&self, time: f64) -> Result<Point3<f64>> {
        let (segment, t) = self.segment_and_time(time)?;
        Ok(segment.point_at(t))
    }

    /// Unit tangent at normalized time `time`.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InsufficientPoints`] with fewer than two points,
    /// or [`BezierError::Degenerate`] when every segment is collapsed to a
    /// point.
    pub fn tangent_at(&self, time: f64) -> Result<Vector3<f64>> {
        let (segment, t) = self.direction_segment_and_time(time)?;
        segment.tangent_at(t)
    }

    /// Unit normal at normalized time `time` for the given up hint.
    ///
    /// # Errors
    ///
    /// As for [`Self::tangent_at`].
    pub fn normal_at(&self, time: f64, up: &Vector3<f64>) -> Result<Vector3<f64>> {
        let (segment, t) = self.direction_segment_and_time(time)?;
        segment.normal_at(t, up)
    }

    /// Unit binormal at normalized time `time` for the given up hint.
    ///
    /// # Errors
    ///
    /// As for [`Self::tangent_at`].
    pub fn binormal_at(&self, time: f64, up: &Vector3<f64>) -> Result<Vector3<f64>> {
        let (segment, t) = self.direction_segment_and_time(time)?;
        segment.binormal_at(t, up)
    }

    /// Look rotation at normalized time `time`: local `+Z` along the tangent,
    /// local `+Y` along the normal.
    ///
    /// # Errors
    ///
    /// As for [`Self::tangent_at`].
    pub fn orientation_at(&self, time: f64, up: &Vector3<f64>) -> Result<UnitQuaternion<f64>> {
        let (segment, t) = self.direction_segment_and_time(time)?;
        segment.orientation_at(t, up)
    }

    /// Position and orthonormal frame at normalized time `time`.
    ///
    /// The frame's `t` is the normalized time, not the segment-local one. At a
    /// collapsed end segment the frame comes from the joint with its neighbour,
    /// which sits at the same position.
    ///
    /// # Errors
    ///
    /// As for [`Self::tangent_at`].
    pub fn frame_at(&self, time: f64, up: &Vector3<f64>) -> Result<Frame> {
        let (segment, t) = self.direction_segment_and_time(time)?;
        let mut frame = segment.frame_at(t, up)?;
        frame.t = time.clamp(0.0, 1.0);
        Ok(frame)
    }

    /// Approximate length of the whole curve. Zero with fewer than two points.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InvalidSampling`] only if the sampling is 0,
    /// which the curve never allows.
    pub fn approximate_length(&self) -> Result<f64> {
        arc_length::total_length(&self.segments(), self.sampling)
    }

    /// Polyline through `sampling + 1` positions at `τ = i / sampling`.
    ///
    /// This is the line strip a renderer draws for the curve.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InsufficientPoints`] with fewer than two points.
    pub fn tessellate(&self) -> Result<Vec<Point3<f64>>> {
        let segments = self.require_segments()?;
        let table = ArcLengthTable::new(&segments, self.sampling)?;

        let mut polyline = Vec::with_capacity(self.sampling + 1);
        for i in 0..=self.sampling {
            let location = table.locate(i as f64 / self.sampling as f64);
            if let Some(segment) = segments.get(location.segment) {
                polyline.push(segment.point_at(location.local_time));
            }
        }
        Ok(polyline)
    }
}

/// Raw serialized form of a [`BezierCurve`], checked on conversion.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct CurveRecord {
    points: Vec<ControlPoint>,
    sampling: usize,
    transform: Isometry3<f64>,
    next_id: u64,
}

#[cfg(feature = "serde")]
impl TryFrom<CurveRecord> for BezierCurve {
    type Error = BezierError;

    fn try_from(record: CurveRecord) -> Result<Self> {
        if record.sampling == 0 {
            return Err(BezierError::InvalidSampling(record.sampling));
        }

        let mut seen = std::collections::HashSet::with_capacity(record.points.len());
        for point in &record.points {
            if !seen.insert(point.id()) {
                return Err(BezierError::DuplicatePointId(point.id().get()));
            }
        }
        let next_id = record
            .points
            .iter()
            .map(|p| p.id().get().saturating_add(1))
            .fold(record.next_id, u64::max);

        let mut transform = record.transform;
        transform.rotation = crate::point::renormalize(transform.rotation.into_inner())?;

        Ok(Self {
            points: record.points,
            sampling: record.sampling,
            transform,
            next_id,
        })
    }
}

/// One unit past `from`, continuing the direction `away_from -> from`.
fn extrapolate(from: Point3<f64>, away_from: Point3<f64>) -> Point3<f64> {
    let direction = (from - away_from)
        .try_normalize(EXTRAPOLATION_EPSILON)
        .unwrap_or_else(Vector3::zeros);
    from + direction
}
