//! Regular polygons on a plane.

use std::f64::consts::{PI, TAU};

use super::core::{Plane, Point3, Tolerance};
use super::error::{GeomResult, positive};
use super::polyline::Polyline;

pub const MIN_POLYGON_SIDES: usize = 3;

fn side_count(sides: i32) -> usize {
    match usize::try_from(sides) {
        Ok(n) if n >= MIN_POLYGON_SIDES => n,
        _ => {
            log::warn!("polygon with {sides} sides requested, using {MIN_POLYGON_SIDES}");
            MIN_POLYGON_SIDES
        }
    }
}

/// Closed polygon with `sides` vertices at `radius` from the plane origin,
/// the first at angle `phase` from the plane's X axis.
fn polygon_on_circle(plane: Plane, radius: f64, sides: usize, phase: f64) -> GeomResult<Polyline> {
    let points: Vec<Point3> = (0..sides)
        .map(|i| {
            let angle = phase + TAU * i as f64 / sides as f64;
            plane.point_at(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    Polyline::new_closed(points, Tolerance::ZERO_LENGTH)
}

/// Polygon whose vertices lie on the circle of `radius`, first vertex on the
/// plane's X axis.
///
/// # Errors
/// Returns [`GeomError::NonPositive`](super::error::GeomError::NonPositive) unless `radius > 0`.
pub fn inscribed_polygon(plane: Plane, radius: f64, sides: i32) -> GeomResult<Polyline> {
    let radius = positive("radius", radius)?;
    polygon_on_circle(plane, radius, side_count(sides), 0.0)
}

/// Polygon whose edges touch the circle of `radius`, first edge midpoint on
/// the plane's X axis.
///
/// # Errors
/// Returns [`GeomError::NonPositive`](super::error::GeomError::NonPositive) unless `radius > 0`.
pub fn circumscribed_polygon(plane: Plane, radius: f64, sides: i32) -> GeomResult<Polyline> {
    let radius = positive("radius", radius)?;
    let n = side_count(sides);
    let half = PI / n as f64;
    polygon_on_circle(plane, radius / half.cos(), n, -half)
}

/// Polygon with edges of `edge_length`, first vertex on the plane's Y axis.
///
/// # Errors
/// Returns [`GeomError::NonPositive`](super::error::GeomError::NonPositive) unless `edge_length > 0`.
pub fn edge_polygon(plane: Plane, edge_length: f64, sides: i32) -> GeomResult<Polyline> {
    let edge_length = positive("edge_length", edge_length)?;
    let n = side_count(sides);
    let radius = edge_length / (2.0 * (PI / n as f64).sin());
    let points: Vec<Point3> = (0..n)
        .map(|i| {
            let t = TAU * i as f64 / n as f64;
            plane.point_at(radius * t.sin(), radius * t.cos())
        })
        .collect();
    Polyline::new_closed(points, Tolerance::ZERO_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GeomError;

    #[test]
    fn edge_polygon_has_requested_edge_length() {
        let hex = edge_polygon(Plane::WORLD_XY, 2.0, 6).unwrap();
        assert_eq!(hex.vertex_count(), 6);
        assert!(hex.is_closed());
        for seg in hex.segments() {
            assert!((seg.length() - 2.0).abs() < 1e-12);
        }
        assert!(hex.points()[0].distance_to(Point3::new(0.0, 2.0, 0.0)) < 1e-12);
    }

    #[test]
    fn circumscribed_square_touches_circle_at_edge_midpoints() {
        let square = circumscribed_polygon(Plane::WORLD_XY, 1.0, 4).unwrap();
        for seg in square.segments() {
            assert!((seg.midpoint().to_vec3().length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn too_few_sides_clamp_to_triangle() {
        let tri = inscribed_polygon(Plane::WORLD_XY, 1.0, 1).unwrap();
        assert_eq!(tri.vertex_count(), 3);
        assert_eq!(tri.points()[0], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        assert!(matches!(
            inscribed_polygon(Plane::WORLD_XY, 0.0, 5),
            Err(GeomError::NonPositive { name: "radius", .. })
        ));
    }
}
