//! Property-based tests for curve evaluation and editing.
//!
//! These tests use proptest to generate random curves and verify invariants.
//!
//! Run with: cargo test -p bezier-curve -- proptest

#![allow(clippy::unwrap_used)]

use bezier_curve::{BezierCurve, CubicSegment, HandleMode, SegmentLocation};
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_offset() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-3.0..3.0f64).prop_map(|[x, y, z]| Vector3::new(x, y, z))
}

fn arb_mode() -> impl Strategy<Value = HandleMode> {
    prop_oneof![Just(HandleMode::Connected), Just(HandleMode::Broken)]
}

fn arb_segment() -> impl Strategy<Value = CubicSegment> {
    (arb_point(), arb_point(), arb_point(), arb_point())
        .prop_map(|(p0, p1, p2, p3)| CubicSegment::new(p0, p1, p2, p3))
}

/// One control point: position, mode, left and right handle offsets.
type PointSpec = (Point3<f64>, HandleMode, Vector3<f64>, Vector3<f64>);

fn arb_curve(min_points: usize, max_points: usize) -> impl Strategy<Value = BezierCurve> {
    let spec = (arb_point(), arb_mode(), arb_offset(), arb_offset());
    (
        prop::collection::vec(spec, min_points..=max_points),
        1usize..60,
    )
        .prop_map(|(specs, sampling): (Vec<PointSpec>, usize)| {
            let mut curve = BezierCurve::new();
            curve.set_sampling(sampling).unwrap();
            for (position, mode, left, right) in specs {
                let point = curve.append_point();
                point.set_position(position);
                point.set_handle_mode(mode);
                point.set_left_handle_offset(left);
                point.set_right_handle_offset(right);
            }
            curve
        })
}

// =============================================================================
// Segment math
// =============================================================================

proptest! {
    #[test]
    fn proptest_segment_interpolates_endpoints(segment in arb_segment()) {
        prop_assert_eq!(segment.point_at(0.0), segment.p0);
        prop_assert_eq!(segment.point_at(1.0), segment.p3);
    }

    #[test]
    fn proptest_length_grows_under_refinement(segment in arb_segment(), samples in 1usize..64) {
        let coarse = segment.approximate_length(samples).unwrap();
        let fine = segment.approximate_length(samples * 2).unwrap();
        prop_assert!(coarse <= fine + 1e-9 * (1.0 + fine));
        prop_assert!(coarse + 1e-9 >= (segment.p3 - segment.p0).norm());
    }

    #[test]
    fn proptest_straight_segment_length_is_exact(
        a in arb_point(),
        b in arb_point(),
        s1 in 0.0..0.5f64,
        s2 in 0.5..1.0f64,
        samples in 1usize..100,
    ) {
        let segment = CubicSegment::new(a, a + (b - a) * s1, a + (b - a) * s2, b);
        let length = segment.approximate_length(samples).unwrap();
        let chord = (b - a).norm();
        prop_assert!((length - chord).abs() <= 1e-9 * (1.0 + chord));
    }

    #[test]
    fn proptest_frame_is_orthonormal(segment in arb_segment(), t in 0.0..=1.0f64, up in arb_offset()) {
        let frame = segment.frame_at(t, &up).unwrap();
        prop_assert!(frame.is_orthonormal(1e-5));
    }
}

// =============================================================================
// Curve behavior
// =============================================================================

proptest! {
    #[test]
    fn proptest_locate_boundaries(curve in arb_curve(2, 6)) {
        let last = curve.segment_count() - 1;
        prop_assert_eq!(curve.locate(0.0).unwrap(), SegmentLocation::new(0, 0.0));
        prop_assert_eq!(curve.locate(1.0).unwrap(), SegmentLocation::new(last, 1.0));
        prop_assert_eq!(curve.point_at(0.0).unwrap(), curve.points()[0].position());
        prop_assert_eq!(curve.point_at(1.0).unwrap(), curve.points()[last + 1].position());
    }

    #[test]
    fn proptest_locate_in_range(curve in arb_curve(2, 6), time in 0.0..=1.0f64) {
        let location = curve.locate(time).unwrap();
        prop_assert!(location.segment < curve.segment_count());
        prop_assert!((0.0..=1.0).contains(&location.local_time));
    }

    #[test]
    fn proptest_curve_frames_orthonormal(
        curve in arb_curve(2, 5),
        time in 0.0..=1.0f64,
        up in arb_offset(),
    ) {
        let frame = curve.frame_at(time, &up).unwrap();
        prop_assert!(frame.is_orthonormal(1e-5));
        let q = curve.orientation_at(time, &up).unwrap();
        prop_assert!((q * Vector3::z() - frame.tangent).norm() < 1e-5);
    }

    #[test]
    fn proptest_connected_handles_mirror(curve in arb_curve(1, 4), v in arb_offset()) {
        let mut curve = curve;
        let point = curve.point_mut(0).unwrap();
        point.set_handle_mode(HandleMode::Connected);

        point.set_left_handle_offset(v);
        prop_assert_eq!(point.right_handle_offset(), -v);

        point.set_right_handle_offset(v);
        prop_assert_eq!(point.left_handle_offset(), -v);
    }

    #[test]
    fn proptest_broken_handles_independent(curve in arb_curve(1, 4), v in arb_offset()) {
        let mut curve = curve;
        let point = curve.point_mut(0).unwrap();
        point.set_handle_mode(HandleMode::Broken);

        let right = point.right_handle_offset();
        point.set_left_handle_offset(v);
        prop_assert_eq!(point.right_handle_offset(), right);

        let left = point.left_handle_offset();
        point.set_right_handle_offset(v);
        prop_assert_eq!(point.left_handle_offset(), left);
    }

    #[test]
    fn proptest_insert_remove_round_trip(curve in arb_curve(2, 6), index_seed in 0usize..100) {
        let index = index_seed % (curve.point_count() + 1);
        let mut edited = curve.clone();
        edited.insert_point_at(index).unwrap();
        prop_assert_eq!(edited.point_count(), curve.point_count() + 1);
        prop_assert!(edited.remove_point_at(index));
        prop_assert_eq!(edited.points(), curve.points());
    }

    #[test]
    fn proptest_length_matches_table(curve in arb_curve(2, 6)) {
        let table = curve.arc_length_table().unwrap();
        let total = curve.approximate_length().unwrap();
        prop_assert!((table.total_length() - total).abs() <= 1e-9 * (1.0 + total));
        let sum: f64 = table.fractions().iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
    }
}
