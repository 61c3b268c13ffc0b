//! Tests for corner blending and curve closing through the Bezier backend.

use crate::geom::{
    BezierBackend, BezierSpan, CloseCurveOptions, Continuity, CornerBlendOptions, Curve3,
    CurveBackend, GeomError, GeomErrorKind, Point3, PolyCurve, Polyline, close_curve,
    smooth_corners, smooth_corners_by_distance,
};

fn backend() -> BezierBackend {
    BezierBackend::default()
}

/// Open L: (0,0) -> (4,0) -> (4,4).
fn open_l() -> PolyCurve {
    let pl = Polyline::from_coords(&[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 4.0, 0.0]]).unwrap();
    PolyCurve::from_polyline(&pl).unwrap()
}

fn cubic(points: [[f64; 3]; 4]) -> BezierSpan {
    BezierSpan::new(points.into_iter().map(Point3::from).collect()).unwrap()
}

/// Two bulging cubics meeting at a right-angle corner at (4,0).
fn curved_corner() -> (BezierSpan, BezierSpan, PolyCurve) {
    let a = cubic([[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [3.0, 1.0, 0.0], [4.0, 0.0, 0.0]]);
    let b = cubic([[4.0, 0.0, 0.0], [5.0, 1.0, 0.0], [5.0, 3.0, 0.0], [4.0, 4.0, 0.0]]);
    let curve = PolyCurve::from_spans(vec![a.clone(), b.clone()]).unwrap();
    (a, b, curve)
}

fn closed_triangle() -> PolyCurve {
    let pl = Polyline::from_coords(&[
        [0.0, 0.0, 0.0],
        [3.0, 0.0, 0.0],
        [0.0, 3.0, 0.0],
        [0.0, 0.0, 0.0],
    ])
    .unwrap();
    PolyCurve::from_polyline(&pl).unwrap()
}

#[test]
fn continuity_selects_blend_degree() {
    for (continuity, degree) in [
        (Continuity::Position, 1),
        (Continuity::Tangency, 3),
        (Continuity::Curvature, 5),
    ] {
        let (out, _) = smooth_corners(
            &backend(),
            &open_l(),
            0.5,
            CornerBlendOptions::new(continuity),
        )
        .unwrap();
        assert_eq!(out.span_count(), 3);
        assert_eq!(out.spans()[1].degree(), degree, "{continuity:?}");
    }
}

#[test]
fn curvature_blend_matches_curvature_at_both_joints() {
    let (_, _, curve) = curved_corner();
    let (out, _) = smooth_corners(
        &backend(),
        &curve,
        0.5,
        CornerBlendOptions::new(Continuity::Curvature),
    )
    .unwrap();
    let spans = out.spans();
    assert_eq!(spans.len(), 3);
    let (kept_a, blend, kept_b) = (&spans[0], &spans[1], &spans[2]);

    let k_in = kept_a.curvature_at(1.0).unwrap();
    let k_out = kept_b.curvature_at(0.0).unwrap();
    assert!(k_in > 0.1 && k_out > 0.1);
    assert!((blend.curvature_at(0.0).unwrap() - k_in).abs() < 1e-6);
    assert!((blend.curvature_at(1.0).unwrap() - k_out).abs() < 1e-6);

    let t_in = kept_a.tangent_at(1.0).unwrap();
    let t_out = kept_b.tangent_at(0.0).unwrap();
    assert!((blend.tangent_at(0.0).unwrap() - t_in).length() < 1e-9);
    assert!((blend.tangent_at(1.0).unwrap() - t_out).length() < 1e-9);
}

#[test]
fn distance_inset_on_curved_spans_measures_arc_length() {
    let (a, b, curve) = curved_corner();
    let distance = 1.25;
    let (out, diag) = smooth_corners_by_distance(
        &backend(),
        &curve,
        distance,
        CornerBlendOptions::new(Continuity::Tangency),
    )
    .unwrap();
    assert_eq!(diag.midpoint_fallback_count, 0);
    let spans = out.spans();
    assert_eq!(spans.len(), 3);

    // The kept pieces lose exactly `distance` of arc length at the corner.
    assert!((spans[0].arc_length() - (a.arc_length() - distance)).abs() < 1e-6);
    assert!((spans[2].arc_length() - (b.arc_length() - distance)).abs() < 1e-6);

    // The blend starts and ends on the original spans, `distance` of arc
    // away from the corner.
    let corner = Point3::new(4.0, 0.0, 0.0);
    let start = spans[1].start();
    let end = spans[1].end();
    assert!(start.distance_to(spans[0].end()) < 1e-9);
    assert!(end.distance_to(spans[2].start()) < 1e-9);
    assert!(start.distance_to(corner) < distance);
    assert!(end.distance_to(corner) < distance);
    assert!(spans[0].start().distance_to(a.start()) < 1e-12);
    assert!(spans[2].end().distance_to(b.end()) < 1e-12);
}

#[test]
fn tangency_blend_leaves_along_incoming_segment() {
    let (out, _) = smooth_corners(
        &backend(),
        &open_l(),
        0.5,
        CornerBlendOptions::new(Continuity::Tangency),
    )
    .unwrap();
    let blend = &out.spans()[1];
    let control = blend.control_points();
    assert!(control[0].distance_to(Point3::new(3.0, 0.0, 0.0)) < 1e-9);
    assert!(control[3].distance_to(Point3::new(4.0, 1.0, 0.0)) < 1e-9);
    let out_dir = (control[1] - control[0]).normalized().unwrap();
    let in_dir = (control[3] - control[2]).normalized().unwrap();
    assert!((out_dir.x - 1.0).abs() < 1e-9);
    assert!((in_dir.y - 1.0).abs() < 1e-9);
}

#[test]
fn zero_distance_returns_input() {
    let curve = closed_triangle();
    let (out, diag) =
        smooth_corners_by_distance(&backend(), &curve, 0.0, CornerBlendOptions::default()).unwrap();
    assert_eq!(out, curve);
    assert!(diag.closed);
    assert_eq!(diag.blended_corner_count, 0);
}

#[test]
fn parameter_outside_unit_interval_is_input_error() {
    let err = smooth_corners(&backend(), &open_l(), 1.5, CornerBlendOptions::default()).unwrap_err();
    assert!(matches!(err, GeomError::ParameterOutOfRange { name: "t", .. }));
    assert_eq!(err.kind(), GeomErrorKind::Input);
}

#[test]
fn close_curve_on_closed_curve_keeps_geometry() {
    let curve = closed_triangle();
    let out = close_curve(&backend(), &curve, CloseCurveOptions::default()).unwrap();
    assert_eq!(out.domain(), (0.0, 1.0));
    for i in 0..=10 {
        let t = f64::from(i) / 10.0;
        assert!(out.point_at(t).distance_to(curve.point_at(t)) < 1e-9);
    }
}

#[test]
fn close_curve_tangency_meets_both_ends_smoothly() {
    let options = CloseCurveOptions::default().with_continuity(Continuity::Tangency);
    let closed = close_curve(&backend(), &open_l(), options).unwrap();
    assert!(backend().is_closed(&closed));
    let blend = closed.spans().last().unwrap();
    let control = blend.control_points();
    assert_eq!(blend.degree(), 3);
    // Leaves (4,4) heading up, arrives at the origin heading along +x.
    assert!((control[1] - control[0]).normalized().unwrap().y > 1.0 - 1e-9);
    assert!((control[3] - control[2]).normalized().unwrap().x > 1.0 - 1e-9);
}

#[test]
fn close_curve_rejects_negative_factor() {
    let options = CloseCurveOptions::default().with_factor(-0.5);
    assert!(matches!(
        close_curve(&backend(), &open_l(), options),
        Err(GeomError::ParameterOutOfRange { name: "factor", .. })
    ));
}

#[test]
fn continuity_codes_round_trip_through_host_integers() {
    for continuity in [Continuity::Position, Continuity::Tangency, Continuity::Curvature] {
        assert_eq!(Continuity::try_from(continuity.code()).unwrap(), continuity);
    }
    assert!(Continuity::try_from(3).is_err());
}
