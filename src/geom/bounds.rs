//! Axis-aligned bounding rectangles in an arbitrary plane.

use serde::{Deserialize, Serialize};

use super::core::{BBox, Plane, Point3};
use super::polyline::Polyline;

/// How [`bounding_rectangles`] groups its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundingMode {
    /// One rectangle per input.
    #[default]
    PerObject,
    /// A single rectangle around every input.
    Union,
}

/// Smallest rectangle aligned with the plane axes that contains the
/// projection of `points` onto `plane`, as a closed polyline lying in the
/// plane. `None` for an empty point set.
#[must_use]
pub fn bounding_rectangle(plane: Plane, points: &[Point3]) -> Option<Polyline> {
    let projected: Vec<Point3> = points
        .iter()
        .map(|&p| {
            let (u, v) = plane.project(p);
            Point3::new(u, v, 0.0)
        })
        .collect();
    let bbox = BBox::from_points(&projected)?;
    let (min, max) = (bbox.min, bbox.max);
    Some(Polyline::from_points_unchecked(vec![
        plane.point_at(min.x, min.y),
        plane.point_at(max.x, min.y),
        plane.point_at(max.x, max.y),
        plane.point_at(min.x, max.y),
        plane.point_at(min.x, min.y),
    ]))
}

/// Bounding rectangles of several polylines in `plane`.
///
/// An empty input yields no rectangles in either mode.
#[must_use]
pub fn bounding_rectangles(plane: Plane, polylines: &[Polyline], mode: BoundingMode) -> Vec<Polyline> {
    match mode {
        BoundingMode::PerObject => polylines
            .iter()
            .filter_map(|polyline| bounding_rectangle(plane, polyline.points()))
            .collect(),
        BoundingMode::Union => {
            let all: Vec<Point3> = polylines
                .iter()
                .flat_map(|polyline| polyline.points().iter().copied())
                .collect();
            bounding_rectangle(plane, &all).into_iter().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;

    fn triangle(offset: f64) -> Polyline {
        Polyline::new(vec![
            Point3::new(offset, 0.0, 0.0),
            Point3::new(offset + 2.0, 1.0, 5.0),
            Point3::new(offset + 1.0, 3.0, -1.0),
        ])
        .unwrap()
    }

    #[test]
    fn world_rectangle_spans_the_extents() {
        let rect = bounding_rectangle(Plane::WORLD_XY, triangle(0.0).points()).unwrap();
        assert!(rect.is_closed());
        assert_eq!(
            rect.vertices(),
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 3.0, 0.0),
                Point3::new(0.0, 3.0, 0.0),
            ]
        );
        assert!(bounding_rectangle(Plane::WORLD_XY, &[]).is_none());
    }

    #[test]
    fn union_covers_every_input() {
        let inputs = [triangle(0.0), triangle(10.0)];
        let per_object = bounding_rectangles(Plane::WORLD_XY, &inputs, BoundingMode::PerObject);
        assert_eq!(per_object.len(), 2);

        let union = bounding_rectangles(Plane::WORLD_XY, &inputs, BoundingMode::Union);
        assert_eq!(union.len(), 1);
        assert!((union[0].length() - 2.0 * (12.0 + 3.0)).abs() < 1e-12);
        assert!(bounding_rectangles(Plane::WORLD_XY, &[], BoundingMode::Union).is_empty());
    }

    #[test]
    fn rectangle_lies_in_tilted_plane() {
        let plane = Plane::from_normal(Point3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 1.0)).unwrap();
        let rect = bounding_rectangle(plane, triangle(0.0).points()).unwrap();
        for p in rect.points() {
            assert!((*p - plane.origin).dot(plane.normal()).abs() < 1e-9);
        }
        for p in triangle(0.0).points() {
            let (u, v) = plane.project(*p);
            let (lo, hi) = (plane.project(rect.points()[0]), plane.project(rect.points()[2]));
            assert!(u >= lo.0 - 1e-9 && u <= hi.0 + 1e-9);
            assert!(v >= lo.1 - 1e-9 && v <= hi.1 + 1e-9);
        }
    }
}
