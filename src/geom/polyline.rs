//! The polyline value type shared by the refinement and editing operations.
//!
//! A polyline stores its points verbatim. A closed polyline carries an explicit
//! copy of its first point at the end; every operation that produces a closed
//! result appends that copy itself rather than relying on incidental equality.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, centroid};
use super::curve::Line3;
use super::error::{GeomError, GeomResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPolyline")]
pub struct Polyline {
    points: Vec<Point3>,
}

/// Wire shape of [`Polyline`]; deserialized values go through [`Polyline::new`].
#[derive(Deserialize)]
struct RawPolyline {
    points: Vec<Point3>,
}

impl TryFrom<RawPolyline> for Polyline {
    type Error = GeomError;

    fn try_from(raw: RawPolyline) -> GeomResult<Self> {
        Self::new(raw.points)
    }
}

impl Polyline {
    /// Create a polyline from at least two points.
    ///
    /// # Errors
    /// Returns [`GeomError::InsufficientPoints`] for fewer than two points.
    pub fn new(points: Vec<Point3>) -> GeomResult<Self> {
        if points.len() < 2 {
            return Err(GeomError::InsufficientPoints {
                required: 2,
                count: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Create a closed polyline.
    ///
    /// If the last point already lies within `tol` of the first it is snapped
    /// onto it, otherwise a copy of the first point is appended.
    ///
    /// # Errors
    /// Returns [`GeomError::InsufficientPoints`] when fewer than three distinct
    /// vertices are supplied.
    pub fn new_closed(mut points: Vec<Point3>, tol: Tolerance) -> GeomResult<Self> {
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if points.len() > 1 && tol.approx_eq_point3(first, last) {
                points.pop();
            }
        }
        if points.len() < 3 {
            return Err(GeomError::InsufficientPoints {
                required: 3,
                count: points.len(),
            });
        }
        points.push(points[0]);
        Ok(Self { points })
    }

    /// Convenience constructor from coordinate arrays.
    ///
    /// # Errors
    /// Returns [`GeomError::InsufficientPoints`] for fewer than two points.
    pub fn from_coords(coords: &[[f64; 3]]) -> GeomResult<Self> {
        Self::new(coords.iter().copied().map(Point3::from).collect())
    }

    /// Wrap points already known to satisfy the invariants.
    pub(crate) const fn from_points_unchecked(points: Vec<Point3>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }

    /// Number of stored points, closing duplicate included.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// First and last point are identical and enclose at least a triangle's
    /// worth of points.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 3 && self.points.first() == self.points.last()
    }

    #[must_use]
    pub fn is_closed_within(&self, tol: Tolerance) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(&first), Some(&last)) if self.points.len() >= 3 => {
                tol.approx_eq_point3(first, last)
            }
            _ => false,
        }
    }

    /// Distinct vertices, without the closing duplicate of a closed polyline.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        if self.is_closed() {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// Like [`Polyline::vertices`] but judging closedness within `tol`.
    #[must_use]
    pub fn vertices_within(&self, tol: Tolerance) -> &[Point3] {
        if self.is_closed_within(tol) {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    /// Number of segments; a closed polyline's wraparound segment is counted.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[must_use]
    pub fn segment(&self, index: usize) -> Option<Line3> {
        let start = *self.points.get(index)?;
        let end = *self.points.get(index + 1)?;
        Some(Line3::new(start, end))
    }

    pub fn segments(&self) -> impl Iterator<Item = Line3> + '_ {
        self.points.windows(2).map(|w| Line3::new(w[0], w[1]))
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments().map(Line3::length).sum()
    }

    /// Average of the distinct vertices.
    #[must_use]
    pub fn center_point(&self) -> Point3 {
        centroid(self.vertices()).unwrap_or(Point3::ORIGIN)
    }

    /// Return a copy that is explicitly closed, appending the first point when
    /// the ends do not already coincide within `tol`.
    #[must_use]
    pub fn closed_copy(&self, tol: Tolerance) -> Self {
        let mut points = self.points.clone();
        if self.is_closed_within(tol) {
            let last = points.len() - 1;
            points[last] = points[0];
        } else {
            points.push(points[0]);
        }
        Self { points }
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }
}

/// Curve types that can be viewed as, and rebuilt from, a control polygon.
///
/// Refinement and editing operate on [`Polyline`] only; curve types opt in
/// through this trait so callers can feed their curves through those
/// operations and turn the result back into a curve.
pub trait ControlPolygon: Sized {
    fn to_control_polygon(&self) -> Polyline;

    /// Rebuild a curve whose control polygon is `polygon`.
    ///
    /// # Errors
    /// Returns a [`GeomError`] when the polygon cannot describe this curve type.
    fn from_control_polygon(polygon: &Polyline) -> GeomResult<Self>;
}

impl ControlPolygon for Polyline {
    fn to_control_polygon(&self) -> Polyline {
        self.clone()
    }

    fn from_control_polygon(polygon: &Polyline) -> GeomResult<Self> {
        Ok(polygon.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_new_rejects_single_point() {
        let err = Polyline::new(vec![Point3::ORIGIN]).unwrap_err();
        assert_eq!(
            err,
            GeomError::InsufficientPoints {
                required: 2,
                count: 1
            }
        );
    }

    #[test]
    fn test_new_closed_appends_first_point() {
        let pl = Polyline::new_closed(square(), Tolerance::default_geom()).unwrap();
        assert!(pl.is_closed());
        assert_eq!(pl.point_count(), 5);
        assert_eq!(pl.vertex_count(), 4);
        assert_eq!(pl.segment_count(), 4);
        assert!((pl.length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_new_closed_snaps_near_duplicate() {
        let mut pts = square();
        pts.push(Point3::new(1e-5, 0.0, 0.0));
        let pl = Polyline::new_closed(pts, Tolerance::MODEL).unwrap();
        assert_eq!(pl.point_count(), 5);
        assert_eq!(pl.points()[4], pl.points()[0]);
    }

    #[test]
    fn test_center_point_ignores_closing_duplicate() {
        let pl = Polyline::new_closed(square(), Tolerance::default_geom()).unwrap();
        assert_eq!(pl.center_point(), Point3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_closed_copy_of_open_polyline() {
        let pl = Polyline::new(square()).unwrap();
        assert!(!pl.is_closed());
        let closed = pl.closed_copy(Tolerance::default_geom());
        assert!(closed.is_closed());
        assert_eq!(closed.point_count(), 5);
        // Input untouched.
        assert_eq!(pl.point_count(), 4);
    }

    #[test]
    fn test_deserialize_rejects_short_point_lists() {
        let err = serde_json::from_str::<Polyline>(r#"{"points":[]}"#).unwrap_err();
        assert!(err.to_string().contains("at least 2 points"), "{err}");

        let single = r#"{"points":[{"x":1.0,"y":2.0,"z":3.0}]}"#;
        assert!(serde_json::from_str::<Polyline>(single).is_err());
    }

    #[test]
    fn test_serde_preserves_closed_polyline() {
        let pl = Polyline::new_closed(square(), Tolerance::default_geom()).unwrap();
        let json = serde_json::to_string(&pl).unwrap();
        let back: Polyline = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pl);
        assert!(back.is_closed());
    }
}
