//! Cubic Bézier segment math.
//!
//! Stateless evaluation of a single cubic segment. A segment is described by
//! four absolute positions in geometric order: the start point, the start
//! handle, the end handle and the end point. Handle arguments are absolute
//! handle *positions*, not offsets from their owning point.
//!
//! Every operation is available both as a method on [`CubicSegment`] and as a
//! free function taking the four control positions directly.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::{BezierError, Result};

/// Below this norm a derivative or cross product has no usable direction.
const DIRECTION_EPSILON: f64 = 1e-10;

/// Parameter step for the secant fallback when the derivative vanishes.
const SECANT_STEP: f64 = 1e-4;

/// Below this norm the secant fallback is considered collapsed too.
const SECANT_EPSILON: f64 = 1e-15;

/// A single cubic Bézier segment.
///
/// # Equation
///
/// ```text
/// B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃
/// ```
///
/// # Example
///
/// ```
/// use bezier_curve::CubicSegment;
/// use nalgebra::Point3;
///
/// let segment = CubicSegment::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
///     Point3::new(4.0, 0.0, 0.0),
/// );
///
/// let mid = segment.point_at(0.5);
/// assert!((mid.x - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CubicSegment {
    /// Start point.
    pub p0: Point3<f64>,
    /// Start handle (absolute position).
    pub p1: Point3<f64>,
    /// End handle (absolute position).
    pub p2: Point3<f64>,
    /// End point.
    pub p3: Point3<f64>,
}

impl CubicSegment {
    /// Create a new segment from its four control positions.
    #[must_use]
    pub const fn new(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Check if all four controls coincide, leaving no direction anywhere.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        [self.p1, self.p2, self.p3]
            .iter()
            .all(|p| (p - self.p0).norm() <= DIRECTION_EPSILON)
    }

    /// Get the control positions as an array.
    #[must_use]
    pub fn control_points(&self) -> [Point3<f64>; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// Evaluate the position at local parameter `t ∈ [0, 1]`.
    ///
    /// The Bernstein blend is exact at the boundaries: `t = 0` returns `p0`
    /// and `t = 1` returns `p3` bit for bit.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let u2 = u * u;
        let t2 = t * t;

        Point3::from(
            self.p0.coords * (u2 * u)
                + self.p1.coords * (3.0 * u2 * t)
                + self.p2.coords * (3.0 * u * t2)
                + self.p3.coords * (t2 * t),
        )
    }

    /// First derivative (velocity) at local parameter `t`.
    ///
    /// Not normalized; vanishes where a handle coincides with its point.
    #[must_use]
    pub fn derivative_at(&self, t: f64) -> Vector3<f64> {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;

        // B'(t) = 3[-u²P₀ + u(u-2t)P₁ - t(t-2u)P₂ + t²P₃]
        (self.p0.coords * (-u * u)
            + self.p1.coords * (u * (u - 2.0 * t))
            - self.p2.coords * (t * (t - 2.0 * u))
            + self.p3.coords * (t * t))
            * 3.0
    }

    /// Unit tangent at local parameter `t`.
    ///
    /// When the derivative vanishes (a handle sitting on its point, or a cusp)
    /// the direction of a short secant around `t` is used instead, and failing
    /// that the chord `p3 - p0`.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::Degenerate`] if all four controls coincide.
    pub fn tangent_at(&self, t: f64) -> Result<Vector3<f64>> {
        let t = t.clamp(0.0, 1.0);
        let d = self.derivative_at(t);
        let norm = d.norm();
        if norm > DIRECTION_EPSILON {
            return Ok(d / norm);
        }

        let secant =
            self.point_at((t + SECANT_STEP).min(1.0)) - self.point_at((t - SECANT_STEP).max(0.0));
        let secant_norm = secant.norm();
        if secant_norm > SECANT_EPSILON {
            debug!(t, "Derivative vanished, using secant direction");
            return Ok(secant / secant_norm);
        }

        let chord = self.p3 - self.p0;
        let chord_norm = chord.norm();
        if chord_norm > DIRECTION_EPSILON {
            debug!(t, "Derivative vanished, using chord direction");
            return Ok(chord / chord_norm);
        }

        Err(BezierError::degenerate(
            "segment collapsed to a point has no tangent",
        ))
    }

    /// Unit binormal `up × tangent` at local parameter `t`.
    ///
    /// If `up` is parallel to the tangent a fixed helper axis stands in for it.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::tangent_at`] failures.
    pub fn binormal_at(&self, t: f64, up: &Vector3<f64>) -> Result<Vector3<f64>> {
        let tangent = self.tangent_at(t)?;
        Ok(binormal_from(up, &tangent))
    }

    /// Unit normal `tangent × binormal` at local parameter `t`.
    ///
    /// Together with the tangent and binormal this completes a right-handed
    /// orthonormal frame.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::tangent_at`] failures.
    pub fn normal_at(&self, t: f64, up: &Vector3<f64>) -> Result<Vector3<f64>> {
        let tangent = self.tangent_at(t)?;
        let binormal = binormal_from(up, &tangent);
        Ok(tangent.cross(&binormal).normalize())
    }

    /// Look rotation at local parameter `t`: forward along the tangent, up
    /// along the normal.
    ///
    /// The rotation maps local `+Z` to the tangent and local `+Y` to the normal.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::tangent_at`] failures.
    pub fn orientation_at(&self, t: f64, up: &Vector3<f64>) -> Result<UnitQuaternion<f64>> {
        let tangent = self.tangent_at(t)?;
        let binormal = binormal_from(up, &tangent);
        let normal = tangent.cross(&binormal).normalize();
        Ok(UnitQuaternion::face_towards(&tangent, &normal))
    }

    /// Full frame (position, tangent, normal, binormal) at local parameter `t`.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::tangent_at`] failures.
    pub fn frame_at(&self, t: f64, up: &Vector3<f64>) -> Result<Frame> {
        let t = t.clamp(0.0, 1.0);
        let position = self.point_at(t);
        let tangent = self.tangent_at(t)?;
        let binormal = binormal_from(up, &tangent);
        let normal = tangent.cross(&binormal).normalize();
        Ok(Frame::new(position, tangent, normal, binormal, t))
    }

    /// Polyline approximation of the segment length.
    ///
    /// Sums the distances between `samples + 1` positions at
    /// `t = 0, 1/samples, …, 1`. Exact for straight segments whose handles
    /// lie on the chord between the endpoints, and never longer than the true
    /// arc length.
    ///
    /// # Errors
    ///
    /// Returns [`BezierError::InvalidSampling`] if `samples` is 0.
    pub fn approximate_length(&self, samples: usize) -> Result<f64> {
        if samples == 0 {
            return Err(BezierError::InvalidSampling(samples));
        }

        let mut length = 0.0;
        let mut from = self.point_at(0.0);
        for i in 1..=samples {
            let to = self.point_at(i as f64 / samples as f64);
            length += (to - from).norm();
            from = to;
        }

        Ok(length)
    }
}

/// Unit `up × tangent`, with a helper axis when `up` is unusable.
fn binormal_from(up: &Vector3<f64>, tangent: &Vector3<f64>) -> Vector3<f64> {
    let binormal = up.cross(tangent);
    let norm = binormal.norm();
    if norm > DIRECTION_EPSILON {
        return binormal / norm;
    }

    // up is parallel to the tangent (or zero)
    debug!("Up vector parallel to tangent, substituting helper axis");
    let helper = if tangent.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    helper.cross(tangent).normalize()
}

/// Position on the segment `(p0, p1, p2, p3)` at local parameter `t`.
#[must_use]
pub fn evaluate_position(
    t: f64,
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
    p3: Point3<f64>,
) -> Point3<f64> {
    CubicSegment::new(p0, p1, p2, p3).point_at(t)
}

/// Unit tangent on the segment `(p0, p1, p2, p3)` at local parameter `t`.
///
/// # Errors
///
/// See [`CubicSegment::tangent_at`].
pub fn evaluate_tangent(
    t: f64,
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
    p3: Point3<f64>,
) -> Result<Vector3<f64>> {
    CubicSegment::new(p0, p1, p2, p3).tangent_at(t)
}

/// Unit binormal on the segment `(p0, p1, p2, p3)` at local parameter `t`.
///
/// # Errors
///
/// See [`CubicSegment::binormal_at`].
pub fn evaluate_binormal(
    t: f64,
    up: &Vector3<f64>,
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
    p3: Point3<f64>,
) -> Result<Vector3<f64>> {
    CubicSegment::new(p0, p1, p2, p3).binormal_at(t, up)
}

/// Unit normal on the segment `(p0, p1, p2, p3)` at local parameter `t`.
///
/// # Errors
///
/// See [`CubicSegment::normal_at`].
pub fn evaluate_normal(
    t: f64,
    up: &Vector3<f64>,
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
    p3: Point3<f64>,
) -> Result<Vector3<f64>> {
    CubicSegment::new(p0, p1, p2, p3).normal_at(t, up)
}

/// Look rotation on the segment `(p0, p1, p2, p3)` at local parameter `t`.
///
/// # Errors
///
/// See [`CubicSegment::orientation_at`].
pub fn evaluate_orientation(
    t: f64,
    up: &Vector3<f64>,
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
    p3: Point3<f64>,
) -> Result<UnitQuaternion<f64>> {
    CubicSegment::new(p0, p1, p2, p3).orientation_at(t, up)
}

/// Polyline length of the segment `(p0, p1, p2, p3)` using `samples` chords.
///
/// # Errors
///
/// Returns [`BezierError::InvalidSampling`] if `samples` is 0.
pub fn approximate_length(
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
    p3: Point3<f64>,
    samples: usize,
) -> Result<f64> {
    CubicSegment::new(p0, p1, p2, p3).approximate_length(samples)
}
