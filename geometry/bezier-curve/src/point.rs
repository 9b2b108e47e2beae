//! Control points and their tangent handles.

use nalgebra::{Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use nalgebra::Quaternion;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::BezierError;

/// Below this norm a stored rotation cannot be renormalized.
#[cfg(feature = "serde")]
const ROTATION_EPSILON: f64 = 1e-10;

/// How the two handles of a control point relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HandleMode {
    /// The handles mirror each other through the point: setting one sets the
    /// other to its negation, giving a smooth joint.
    #[default]
    Connected,
    /// The handles move independently, allowing a corner.
    Broken,
}

/// Identity of a control point, unique within the curve that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointId(pub(crate) u64);

impl PointId {
    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// An anchor position with two tangent handles.
///
/// Handle offsets are expressed in the point's own frame (its position and
/// rotation), never the curve's. The handle mirroring of
/// [`HandleMode::Connected`] is enforced by every setter here, so it holds no
/// matter who edits the point.
///
/// Points are created by [`BezierCurve`](crate::BezierCurve), which owns them.
///
/// Deserialized points are renormalized and, when connected, have their right
/// handle snapped to the mirror of the left one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "ControlPointRecord")
)]
pub struct ControlPoint {
    id: PointId,
    position: Point3<f64>,
    rotation: UnitQuaternion<f64>,
    left_handle: Vector3<f64>,
    right_handle: Vector3<f64>,
    handle_mode: HandleMode,
}

impl ControlPoint {
    /// Default offset of the left handle.
    pub const DEFAULT_LEFT_HANDLE: Vector3<f64> = Vector3::new(-0.5, 0.0, 0.0);
    /// Default offset of the right handle.
    pub const DEFAULT_RIGHT_HANDLE: Vector3<f64> = Vector3::new(0.5, 0.0, 0.0);

    pub(crate) fn new(id: PointId, position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            id,
            position,
            rotation,
            left_handle: Self::DEFAULT_LEFT_HANDLE,
            right_handle: Self::DEFAULT_RIGHT_HANDLE,
            handle_mode: HandleMode::Connected,
        }
    }

    /// Identity of this point.
    #[must_use]
    pub fn id(&self) -> PointId {
        self.id
    }

    /// World-space anchor position.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Move the anchor. Handles move with it.
    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    /// Rotation of the point's own frame.
    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    /// Rotate the point's frame. Handle offsets are kept, so handles swing
    /// around the anchor.
    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.rotation = rotation;
    }

    /// Current handle mode.
    #[must_use]
    pub fn handle_mode(&self) -> HandleMode {
        self.handle_mode
    }

    /// Change the handle mode.
    ///
    /// Switching to [`HandleMode::Connected`] snaps the right handle to the
    /// mirror of the left one.
    pub fn set_handle_mode(&mut self, mode: HandleMode) {
        self.handle_mode = mode;
        if mode == HandleMode::Connected {
            self.right_handle = -self.left_handle;
        }
    }

    /// Left handle offset in the point's frame.
    #[must_use]
    pub fn left_handle_offset(&self) -> Vector3<f64> {
        self.left_handle
    }

    /// Right handle offset in the point's frame.
    #[must_use]
    pub fn right_handle_offset(&self) -> Vector3<f64> {
        self.right_handle
    }

    /// Set the left handle offset, mirroring it onto the right handle when
    /// connected.
    pub fn set_left_handle_offset(&mut self, offset: Vector3<f64>) {
        self.left_handle = offset;
        if self.handle_mode == HandleMode::Connected {
            self.right_handle = -offset;
        }
    }

    /// Set the right handle offset, mirroring it onto the left handle when
    /// connected.
    pub fn set_right_handle_offset(&mut self, offset: Vector3<f64>) {
        self.right_handle = offset;
        if self.handle_mode == HandleMode::Connected {
            self.left_handle = -offset;
        }
    }

    /// Absolute position of the left handle.
    #[must_use]
    pub fn left_handle_position(&self) -> Point3<f64> {
        self.to_world(self.left_handle)
    }

    /// Absolute position of the right handle.
    #[must_use]
    pub fn right_handle_position(&self) -> Point3<f64> {
        self.to_world(self.right_handle)
    }

    /// Place the left handle at an absolute position.
    pub fn set_left_handle_position(&mut self, position: Point3<f64>) {
        let offset = self.to_local(position);
        self.set_left_handle_offset(offset);
    }

    /// Place the right handle at an absolute position.
    pub fn set_right_handle_position(&mut self, position: Point3<f64>) {
        let offset = self.to_local(position);
        self.set_right_handle_offset(offset);
    }

    fn to_world(&self, offset: Vector3<f64>) -> Point3<f64> {
        self.position + self.rotation * offset
    }

    fn to_local(&self, position: Point3<f64>) -> Vector3<f64> {
        self.rotation.inverse_transform_vector(&(position - self.position))
    }
}

/// Raw serialized form of a [`ControlPoint`], checked on conversion.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct ControlPointRecord {
    id: PointId,
    position: Point3<f64>,
    rotation: Quaternion<f64>,
    left_handle: Vector3<f64>,
    right_handle: Vector3<f64>,
    handle_mode: HandleMode,
}

#[cfg(feature = "serde")]
impl TryFrom<ControlPointRecord> for ControlPoint {
    type Error = BezierError;

    fn try_from(record: ControlPointRecord) -> Result<Self, Self::Error> {
        let rotation = renormalize(record.rotation)?;
        let mut point = Self {
            id: record.id,
            position: record.position,
            rotation,
            left_handle: record.left_handle,
            right_handle: record.right_handle,
            handle_mode: HandleMode::Broken,
        };
        point.set_handle_mode(record.handle_mode);
        Ok(point)
    }
}

/// Turn a stored quaternion back into a rotation.
#[cfg(feature = "serde")]
pub(crate) fn renormalize(q: Quaternion<f64>) -> Result<UnitQuaternion<f64>, BezierError> {
    UnitQuaternion::try_new(q, ROTATION_EPSILON)
        .ok_or_else(|| BezierError::degenerate("stored rotation has zero length"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn point_at(x: f64, y: f64, z: f64) -> ControlPoint {
        ControlPoint::new(PointId(0), Point3::new(x, y, z), UnitQuaternion::identity())
    }

    #[test]
    fn test_defaults() {
        let p = point_at(0.0, 0.0, 0.0);
        assert_eq!(p.handle_mode(), HandleMode::Connected);
        assert_eq!(p.left_handle_offset(), Vector3::new(-0.5, 0.0, 0.0));
        assert_eq!(p.right_handle_offset(), Vector3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_connected_mirrors_both_ways() {
        let mut p = point_at(1.0, 2.0, 3.0);
        let v = Vector3::new(0.3, -1.0, 2.0);

        p.set_left_handle_offset(v);
        assert_eq!(p.right_handle_offset(), -v);

        p.set_right_handle_offset(v);
        assert_eq!(p.left_handle_offset(), -v);
    }

    #[test]
    fn test_broken_keeps_other_handle() {
        let mut p = point_at(0.0, 0.0, 0.0);
        p.set_handle_mode(HandleMode::Broken);
        let right = p.right_handle_offset();

        p.set_left_handle_offset(Vector3::new(0.0, 4.0, 0.0));
        assert_eq!(p.right_handle_offset(), right);

        let left = p.left_handle_offset();
        p.set_right_handle_offset(Vector3::new(0.0, 0.0, 7.0));
        assert_eq!(p.left_handle_offset(), left);
    }

    #[test]
    fn test_reconnecting_snaps_right_handle() {
        let mut p = point_at(0.0, 0.0, 0.0);
        p.set_handle_mode(HandleMode::Broken);
        p.set_left_handle_offset(Vector3::new(-1.0, 1.0, 0.0));
        p.set_right_handle_offset(Vector3::new(2.0, 0.0, 0.0));

        p.set_handle_mode(HandleMode::Connected);
        assert_eq!(p.right_handle_offset(), Vector3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_handle_positions_use_point_frame() {
        let mut p = point_at(1.0, 0.0, 0.0);
        p.set_rotation(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2));

        // Local +X maps to world +Y
        assert_relative_eq!(
            p.right_handle_position().coords,
            Vector3::new(1.0, 0.5, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            p.left_handle_position().coords,
            Vector3::new(1.0, -0.5, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_set_handle_position_round_trip() {
        let mut p = point_at(2.0, 0.0, 0.0);
        p.set_rotation(UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.7));

        let target = Point3::new(2.0, 1.0, 1.0);
        p.set_left_handle_position(target);
        assert_relative_eq!(p.left_handle_position().coords, target.coords, epsilon = 1e-12);
        // Connected: the right handle sits opposite through the anchor
        assert_relative_eq!(
            p.right_handle_position().coords,
            Vector3::new(2.0, -1.0, -1.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            p.right_handle_offset(),
            -p.left_handle_offset(),
            epsilon = 1e-12
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_snaps_connected_handles() {
        let mut value = serde_json::to_value(point_at(1.0, 0.0, 0.0)).unwrap();
        value["right_handle"] = serde_json::json!([5.0, 5.0, 5.0]);
        let p: ControlPoint = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(p.handle_mode(), HandleMode::Connected);
        assert_eq!(p.right_handle_offset(), Vector3::new(0.5, 0.0, 0.0));

        value["handle_mode"] = serde_json::json!("Broken");
        let p: ControlPoint = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(p.right_handle_offset(), Vector3::new(5.0, 5.0, 5.0));

        value["rotation"] = serde_json::json!([0.0, 0.0, 0.0, 0.0]);
        let err = serde_json::from_value::<ControlPoint>(value).unwrap_err();
        assert!(err.to_string().contains("rotation"));
    }

    #[test]
    fn test_moving_anchor_moves_handles() {
        let mut p = point_at(0.0, 0.0, 0.0);
        p.set_position(Point3::new(0.0, 5.0, 0.0));
        assert_eq!(p.right_handle_position(), Point3::new(0.5, 5.0, 0.0));
        assert_eq!(p.left_handle_offset(), Vector3::new(-0.5, 0.0, 0.0));
    }
}
