//! Orientation frames along a curve.

use nalgebra::{Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A coordinate frame at a point on a curve.
///
/// The frame consists of three mutually orthonormal vectors:
/// - `tangent`: Points along the curve in the direction of increasing time
/// - `normal`: `tangent × binormal`, the up-hint projected off the tangent
/// - `binormal`: `up × tangent`, the sideways axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Position on the curve.
    pub position: Point3<f64>,
    /// Unit tangent vector (forward direction).
    pub tangent: Vector3<f64>,
    /// Unit normal vector.
    pub normal: Vector3<f64>,
    /// Unit binormal vector.
    pub binormal: Vector3<f64>,
    /// Time at which this frame was computed.
    pub t: f64,
}

impl Frame {
    /// Create a new frame with the given components.
    ///
    /// The vectors are assumed to be orthonormal.
    #[must_use]
    pub fn new(
        position: Point3<f64>,
        tangent: Vector3<f64>,
        normal: Vector3<f64>,
        binormal: Vector3<f64>,
        t: f64,
    ) -> Self {
        Self {
            position,
            tangent,
            normal,
            binormal,
            t,
        }
    }

    /// The look rotation of this frame.
    ///
    /// Maps local `+Z` to the tangent and local `+Y` to the normal, matching
    /// [`BezierCurve::orientation_at`](crate::BezierCurve::orientation_at).
    #[must_use]
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::face_towards(&self.tangent, &self.normal)
    }

    /// Transform a frame-local point to world coordinates.
    ///
    /// The local coordinate system has:
    /// - X axis along the tangent
    /// - Y axis along the normal
    /// - Z axis along the binormal
    #[must_use]
    pub fn local_to_world(&self, local: Point3<f64>) -> Point3<f64> {
        self.position + self.tangent * local.x + self.normal * local.y + self.binormal * local.z
    }

    /// Transform a world point to frame-local coordinates.
    #[must_use]
    pub fn world_to_local(&self, world: Point3<f64>) -> Point3<f64> {
        let v = world - self.position;
        Point3::new(
            v.dot(&self.tangent),
            v.dot(&self.normal),
            v.dot(&self.binormal),
        )
    }

    /// Check if the frame is orthonormal within tolerance.
    #[must_use]
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let t_len = (self.tangent.norm() - 1.0).abs();
        let n_len = (self.normal.norm() - 1.0).abs();
        let b_len = (self.binormal.norm() - 1.0).abs();
        let tn_dot = self.tangent.dot(&self.normal).abs();
        let tb_dot = self.tangent.dot(&self.binormal).abs();
        let nb_dot = self.normal.dot(&self.binormal).abs();

        t_len < tolerance
            && n_len < tolerance
            && b_len < tolerance
            && tn_dot < tolerance
            && tb_dot < tolerance
            && nb_dot < tolerance
    }
}
