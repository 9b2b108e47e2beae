//! Piecewise cubic Bézier curves with arc-length-aware evaluation.
//!
//! A [`BezierCurve`] is an ordered sequence of [`ControlPoint`]s, each an
//! anchor with two tangent handles. Consecutive points form cubic segments,
//! and the whole curve is addressed by one normalized time `τ ∈ [0, 1]`
//! spaced approximately uniformly by arc length:
//!
//! - **Evaluation**: Position, tangent, normal, binormal and look rotation
//!   at any `τ`
//! - **Arc length**: Polyline length approximation and `τ` to segment mapping
//! - **Editing**: Insert, append and remove points; connected or broken handles
//! - **Tessellation**: A line strip for renderers
//!
//! The layers, leaves first:
//!
//! - [`segment`]: stateless math on one cubic segment ([`CubicSegment`])
//! - [`arc_length`]: global time to `(segment, local time)` ([`ArcLengthTable`])
//! - [`BezierCurve`] / [`ControlPoint`]: ownership, editing and orchestration
//!
//! # Example
//!
//! ```
//! use bezier_curve::{BezierCurve, CurveParams, HandleMode};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut curve = BezierCurve::with_params(CurveParams::fine());
//! curve.append_point().set_position(Point3::new(0.0, 0.0, 0.0));
//! curve.append_point().set_position(Point3::new(4.0, 0.0, 0.0));
//!
//! // Pull the end handle below the chord
//! let end = curve.point_mut(1).unwrap();
//! end.set_handle_mode(HandleMode::Broken);
//! end.set_left_handle_offset(Vector3::new(0.0, -2.0, 0.0));
//!
//! let up = Vector3::z();
//! let position = curve.point_at(0.5).unwrap();
//! let frame = curve.frame_at(0.5, &up).unwrap();
//! assert!(frame.is_orthonormal(1e-9));
//!
//! let length = curve.approximate_length().unwrap();
//! assert!(length > 4.0);
//! # let _ = position;
//! ```
//!
//! # Degenerate geometry
//!
//! - A vanishing derivative falls back to a short secant, then the chord
//! - An up hint parallel to the tangent is replaced by a fixed helper axis
//! - The time mapping selects a zero-length segment only at `τ = 0` or
//!   `τ = 1`; directions there come from the nearest segment that has one,
//!   at the joint they share
//! - A curve of zero total length maps time uniformly over its segments
//! - [`BezierError::Degenerate`] is reported only when the derivative, the
//!   secant and the chord all vanish, which needs coincident segment ends
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Scene hosting,
//! gizmo rendering and editor tooling consume it through the plain API.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for all data types

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::suboptimal_flops
)]

pub mod arc_length;
mod curve;
mod error;
mod frame;
mod params;
mod point;
pub mod segment;

pub use arc_length::{ArcLengthTable, SegmentLocation};
pub use curve::BezierCurve;
pub use error::BezierError;
pub use frame::Frame;
pub use params::CurveParams;
pub use point::{ControlPoint, HandleMode, PointId};
pub use segment::CubicSegment;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, BezierError>;
