//! Tests for polyline topology edits and fans.

use crate::geom::{
    DefaultTessellator, GeomError, GeomErrorKind, Point3, Polyline, Tolerance, midedge,
    offset_by_parameter, quadrangular_fan, remove_points_by_index, remove_segments_by_index,
    triangular_fan, triangulate,
};

fn tol() -> Tolerance {
    Tolerance::default_geom()
}

/// Five points along a staircase.
fn open_five() -> Polyline {
    Polyline::from_coords(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [2.0, 1.0, 0.0],
        [2.0, 2.0, 0.0],
    ])
    .unwrap()
}

fn open_four() -> Polyline {
    Polyline::from_coords(&[
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [2.0, 2.0, 0.0],
        [0.0, 2.0, 0.0],
    ])
    .unwrap()
}

fn closed_square() -> Polyline {
    open_four().closed_copy(tol())
}

#[test]
fn collapse_removal_reconnects_remaining_points() {
    let pl = open_five();
    let out = remove_points_by_index(&pl, &[1], true, tol()).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].point_count(), 4);
    assert!(!out[0].points().contains(&Point3::new(1.0, 0.0, 0.0)));
    assert_eq!(out[0].points()[1], pl.points()[2]);
}

#[test]
fn split_removal_cuts_at_vertex() {
    let out = remove_points_by_index(&open_five(), &[1], false, tol()).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|run| run.point_count() >= 2));
    assert_eq!(out[0].point_count(), 2);
    assert_eq!(out[1].point_count(), 4);
}

#[test]
fn removal_ignores_order_and_repeats() {
    let pl = open_five();
    let a = remove_points_by_index(&pl, &[3, 1, 3], true, tol()).unwrap();
    let b = remove_points_by_index(&pl, &[1, 3], true, tol()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[0].point_count(), 3);
}

#[test]
fn removal_out_of_range_is_index_error() {
    let err = remove_points_by_index(&open_five(), &[5], true, tol()).unwrap_err();
    assert!(matches!(
        err,
        GeomError::IndexOutOfRange {
            kind: "vertex",
            index: 5,
            count: 5
        }
    ));
    assert_eq!(err.kind(), GeomErrorKind::Index);
}

#[test]
fn collapse_on_closed_keeps_closed_when_possible() {
    let out = remove_points_by_index(&closed_square(), &[2], true, tol()).unwrap();
    assert_eq!(out.len(), 1);
    assert!(out[0].is_closed());
    assert_eq!(out[0].vertex_count(), 3);

    let out = remove_points_by_index(&closed_square(), &[1, 2], true, tol()).unwrap();
    assert!(!out[0].is_closed());
    assert_eq!(out[0].point_count(), 2);
}

#[test]
fn split_closed_at_two_vertices_gives_two_runs() {
    let out = remove_points_by_index(&closed_square(), &[0, 2], false, tol()).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|run| run.point_count() == 3));
    assert!((out[0].length() + out[1].length() - 8.0).abs() < 1e-12);
}

#[test]
fn segment_split_keeps_contiguous_runs() {
    // Segments 0..3 of the closed square; dropping 1 leaves 2, 3, 0 in one run.
    let out = remove_segments_by_index(&closed_square(), &[1], false, tol()).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].point_count(), 4);
    assert_eq!(out[0].points()[0], Point3::new(2.0, 2.0, 0.0));
    assert_eq!(out[0].points()[3], Point3::new(2.0, 0.0, 0.0));

    let out = remove_segments_by_index(&open_five(), &[1, 2], false, tol()).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].point_count(), 2);
    assert_eq!(out[1].point_count(), 2);
}

#[test]
fn segment_collapse_drops_both_ends() {
    let out = remove_segments_by_index(&open_five(), &[0], true, tol()).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].point_count(), 3);
    assert_eq!(out[0].points()[0], Point3::new(1.0, 1.0, 0.0));
}

#[test]
fn midedge_counts_match_segments() {
    let open = midedge(&open_four(), false, tol()).unwrap();
    assert_eq!(open.point_count(), 3);
    assert!(!open.is_closed());

    let closed = midedge(&closed_square(), false, tol()).unwrap();
    assert_eq!(closed.vertex_count(), 4);
    assert!(closed.is_closed());
    assert_eq!(closed.points()[0], Point3::new(1.0, 0.0, 0.0));

    let forced = midedge(&open_four(), true, tol()).unwrap();
    assert!(forced.is_closed());
    assert_eq!(forced.vertex_count(), 3);
}

#[test]
fn midedge_needs_two_segments() {
    let line = Polyline::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
    assert!(matches!(
        midedge(&line, false, tol()),
        Err(GeomError::InsufficientSegments { count: 1, .. })
    ));
}

#[test]
fn offset_zero_and_one() {
    let sq = closed_square();
    assert_eq!(offset_by_parameter(&sq, 0.0).unwrap(), sq);

    let collapsed = offset_by_parameter(&sq, 1.0).unwrap();
    let center = Point3::new(1.0, 1.0, 0.0);
    assert!(collapsed.points().iter().all(|p| p.distance_to(center) < 1e-12));

    let half = offset_by_parameter(&sq, 0.5).unwrap();
    assert!((half.length() - 4.0).abs() < 1e-12);
}

#[test]
fn triangular_fan_has_one_triangle_per_segment() {
    let fan = triangular_fan(&closed_square());
    assert_eq!(fan.len(), 4);
    for tri in &fan {
        assert!(tri.is_closed());
        assert_eq!(tri.vertex_count(), 3);
        assert_eq!(tri.points()[0], Point3::new(1.0, 1.0, 0.0));
    }
}

#[test]
fn quadrangular_fan_wraps_only_when_closed() {
    let closed = quadrangular_fan(&closed_square(), tol());
    assert_eq!(closed.len(), 4);
    assert!(closed.iter().all(|q| q.vertex_count() == 4 && q.is_closed()));

    let open = quadrangular_fan(&open_four(), tol());
    assert_eq!(open.len(), 2);
    assert_eq!(open[0].points()[2], Point3::new(2.0, 0.0, 0.0));
}

#[test]
fn triangulate_closes_open_input() {
    let tris = triangulate(&open_four(), &DefaultTessellator::default(), tol()).unwrap();
    assert_eq!(tris.len(), 2);
    let area: f64 = tris
        .iter()
        .map(|t| {
            let p = t.points();
            (p[1] - p[0]).cross(p[2] - p[0]).length() / 2.0
        })
        .sum();
    assert!((area - 4.0).abs() < 1e-9);
}
