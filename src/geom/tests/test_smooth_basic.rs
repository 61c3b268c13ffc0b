//! Tests for polyline refinement schemes.

use crate::geom::{
    GeomError, GeomErrorKind, Point3, Polyline, SmoothPolylineOptions, SmoothingScheme,
    degree2_smoothing, degree3_smoothing, degree_n_smoothing, smooth_polyline, snub,
};

/// Unit square, closed by repeating the first point.
fn closed_square() -> Polyline {
    Polyline::from_coords(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0],
    ])
    .unwrap()
}

fn zigzag() -> Polyline {
    Polyline::from_coords(&[
        [0.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [2.0, 0.0, 0.0],
        [3.0, 1.0, 0.0],
    ])
    .unwrap()
}

#[test]
fn zero_iterations_return_input() {
    let square = closed_square();
    for scheme in [
        SmoothingScheme::Degree2,
        SmoothingScheme::Degree3,
        SmoothingScheme::DegreeN,
    ] {
        let (out, diag) = smooth_polyline(&square, SmoothPolylineOptions::new(scheme, 0)).unwrap();
        assert_eq!(out, square, "{scheme:?} with zero iterations");
        assert_eq!(diag.iterations_applied, 0);
    }
}

#[test]
fn negative_iterations_are_input_errors() {
    let err = degree3_smoothing(&zigzag(), -2).unwrap_err();
    assert!(matches!(err, GeomError::NegativeIterations { iterations: -2 }));
    assert_eq!(err.kind(), GeomErrorKind::Input);
}

#[test]
fn chaikin_on_closed_square_doubles_vertices() {
    let square = closed_square();
    for k in 0..4 {
        let out = degree2_smoothing(&square, k).unwrap();
        assert!(out.is_closed());
        assert_eq!(out.vertex_count(), 4 * (1 << k));
    }
}

#[test]
fn chaikin_first_pass_cuts_quarter_points() {
    let out = degree2_smoothing(&closed_square(), 1).unwrap();
    assert_eq!(out.points()[0], Point3::new(0.25, 0.0, 0.0));
    assert_eq!(out.points()[1], Point3::new(0.75, 0.0, 0.0));
    assert_eq!(out.points()[2], Point3::new(1.0, 0.25, 0.0));
}

#[test]
fn open_schemes_keep_end_points() {
    let pl = zigzag();
    let first = pl.points()[0];
    let last = pl.points()[3];
    for out in [
        degree2_smoothing(&pl, 3).unwrap(),
        degree3_smoothing(&pl, 3).unwrap(),
        degree_n_smoothing(&pl, 3).unwrap(),
    ] {
        assert!(!out.is_closed());
        assert_eq!(out.points()[0], first);
        assert_eq!(out.points()[out.point_count() - 1], last);
    }
}

#[test]
fn degree3_closed_square_stays_symmetric() {
    let out = degree3_smoothing(&closed_square(), 2).unwrap();
    assert!(out.is_closed());
    assert_eq!(out.vertex_count(), 16);
    let center = out.center_point();
    assert!(center.distance_to(Point3::new(0.5, 0.5, 0.0)) < 1e-12);
}

#[test]
fn degree_n_follows_bezier_of_control_polygon() {
    // Quadratic Bezier through (0,0), (1,2), (2,0) peaks at (1,1).
    let pl = Polyline::from_coords(&[[0.0, 0.0, 0.0], [1.0, 2.0, 0.0], [2.0, 0.0, 0.0]]).unwrap();
    let out = degree_n_smoothing(&pl, 2).unwrap();
    assert_eq!(out.point_count(), 5);
    assert!(out.points()[2].distance_to(Point3::new(1.0, 1.0, 0.0)) < 1e-12);
}

#[test]
fn snub_closed_square_makes_octagon() {
    let out = snub(&closed_square(), 0.5).unwrap();
    assert!(out.is_closed());
    assert_eq!(out.vertex_count(), 8);
    assert_eq!(out.points()[0], Point3::new(0.25, 0.0, 0.0));
}

#[test]
fn snub_clamps_parameter() {
    let pl = zigzag();
    assert_eq!(snub(&pl, 3.0).unwrap(), snub(&pl, 1.0).unwrap());
    assert!(snub(&pl, f64::NAN).is_err());
}
