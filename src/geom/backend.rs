//! Seams to the numeric engines the blending and tessellation code consumes.
//!
//! The corner blender never evaluates smooth curves itself. Everything it
//! needs (reparameterization, splitting, arc length, blend fitting, joining)
//! goes through [`CurveBackend`]. Polygon triangulation and Voronoi cells go
//! through [`TessellationSolver`].

use serde::{Deserialize, Serialize};

use super::core::{BBox, Point3};
use super::error::{BackendError, GeomError};
use super::polyline::Polyline;

/// Geometric continuity requested at both ends of a blend curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Continuity {
    /// Ends touch.
    #[default]
    Position,
    /// Ends touch with matching tangent direction.
    Tangency,
    /// Ends touch with matching tangent and curvature.
    Curvature,
}

impl Continuity {
    /// Integer code used by hosts: 0, 1, 2.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Position => 0,
            Self::Tangency => 1,
            Self::Curvature => 2,
        }
    }

    /// Number of control points the blend places at each end.
    #[must_use]
    pub const fn end_constraints(self) -> usize {
        match self {
            Self::Position => 1,
            Self::Tangency => 2,
            Self::Curvature => 3,
        }
    }
}

impl TryFrom<i32> for Continuity {
    type Error = GeomError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Position),
            1 => Ok(Self::Tangency),
            2 => Ok(Self::Curvature),
            other => Err(GeomError::ParameterOutOfRange {
                name: "continuity",
                value: f64::from(other),
                min: 0.0,
                max: 2.0,
            }),
        }
    }
}

/// One end of a blend: where on which curve, and how the blend leaves it.
///
/// The blend departs from `curve` at `parameter` along the curve's tangent;
/// with `reversed` set the tangent is negated first. `bulge` scales the
/// tangent arm relative to the distance between the two ends.
#[derive(Debug, Clone, Copy)]
pub struct BlendEnd<'a, C> {
    pub curve: &'a C,
    pub parameter: f64,
    pub reversed: bool,
    pub continuity: Continuity,
    pub bulge: f64,
}

impl<'a, C> BlendEnd<'a, C> {
    #[must_use]
    pub const fn new(curve: &'a C, parameter: f64, reversed: bool, continuity: Continuity) -> Self {
        Self {
            curve,
            parameter,
            reversed,
            continuity,
            bulge: 1.0,
        }
    }

    #[must_use]
    pub const fn with_bulge(mut self, bulge: f64) -> Self {
        self.bulge = bulge;
        self
    }
}

/// Smooth-curve engine used by the corner blender.
///
/// Parameters passed to [`CurveBackend::split`], [`CurveBackend::length_parameter`]
/// and blend ends are in the curve's own domain; the blender always
/// reparameterizes to `[0, 1]` first.
pub trait CurveBackend {
    type Curve: Clone;

    /// Copy of `curve` with its domain mapped onto `[0, 1]`.
    fn reparameterize_unit(&self, curve: &Self::Curve) -> Self::Curve;

    /// Copy of `curve` traversed in the opposite direction, same domain.
    fn reverse(&self, curve: &Self::Curve) -> Self::Curve;

    /// Cut `curve` at the given increasing parameters.
    ///
    /// # Errors
    /// Returns [`BackendError::SplitParameter`] for parameters outside the
    /// domain.
    fn split(&self, curve: &Self::Curve, parameters: &[f64]) -> Result<Vec<Self::Curve>, BackendError>;

    fn length(&self, curve: &Self::Curve) -> f64;

    /// Parameter at arc length `distance` from the start, `None` when the
    /// curve is shorter than `distance`.
    fn length_parameter(&self, curve: &Self::Curve, distance: f64) -> Option<f64>;

    /// # Errors
    /// Returns [`BackendError::Blend`] when no blend joins the two ends.
    fn create_blend_curve(
        &self,
        start: BlendEnd<'_, Self::Curve>,
        end: BlendEnd<'_, Self::Curve>,
    ) -> Result<Self::Curve, BackendError>;

    /// Join end-to-end touching curves. The result holds one curve per
    /// connected chain.
    fn join_curves(&self, curves: &[Self::Curve]) -> Vec<Self::Curve>;

    /// The smooth pieces of a piecewise curve, in order.
    fn segments(&self, curve: &Self::Curve) -> Vec<Self::Curve>;

    fn is_closed(&self, curve: &Self::Curve) -> bool;
}

/// Polygon triangulation and Voronoi partition.
pub trait TessellationSolver {
    /// Triangulate a closed polygon given by its distinct vertices.
    ///
    /// # Errors
    /// Returns [`BackendError::Tessellation`] when the polygon cannot be
    /// triangulated.
    fn triangulate_closed_polygon(&self, points: &[Point3]) -> Result<Vec<[usize; 3]>, BackendError>;

    /// Voronoi cells of `sites` clipped to the XY extent of `boundary`, one
    /// closed polyline per site, in site order.
    ///
    /// # Errors
    /// Returns [`BackendError::Tessellation`] when the diagram cannot be built.
    fn voronoi_cells(&self, sites: &[Point3], boundary: BBox) -> Result<Vec<Polyline>, BackendError>;
}
