//! Radial cell grids on a plane.
//!
//! Every grid is built from concentric rings of points. Ring `i` has radius
//! `inner_radius + spacing * i` and its points are spread evenly around the
//! plane origin, the first one on the plane's Y axis, running towards X.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::core::{Plane, Point3};
use super::error::{GeomError, GeomResult, positive};
use super::polyline::Polyline;

/// Cell shape of a radial grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadialGridKind {
    /// One quad per ring band and polar step.
    Quad,
    /// Staggered hexagons; alternate bands are offset by half a cell.
    Hexagon,
    /// Two triangles per diamond of the staggered layout.
    Triangle,
    /// Staggered quads spanning two ring bands.
    Diamond,
}

/// Size and extent of a radial grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialGridOptions {
    /// Radius of the innermost ring; zero collapses it onto the origin.
    pub inner_radius: f64,
    /// Distance between consecutive rings.
    pub spacing: f64,
    /// Number of cells in the radial direction.
    pub radial_count: usize,
    /// Number of cells around each band.
    pub polar_count: usize,
}

impl RadialGridOptions {
    #[must_use]
    pub const fn new(inner_radius: f64, spacing: f64, radial_count: usize, polar_count: usize) -> Self {
        Self {
            inner_radius,
            spacing,
            radial_count,
            polar_count,
        }
    }

    #[must_use]
    pub const fn with_inner_radius(mut self, inner_radius: f64) -> Self {
        self.inner_radius = inner_radius;
        self
    }

    #[must_use]
    pub const fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub const fn with_counts(mut self, radial_count: usize, polar_count: usize) -> Self {
        self.radial_count = radial_count;
        self.polar_count = polar_count;
        self
    }
}

impl Default for RadialGridOptions {
    fn default() -> Self {
        Self::new(1.0, 1.0, 6, 12)
    }
}

/// Closed cell outlines of a radial grid, band by band from the inside out.
///
/// Cell counts per kind, for `r` radial and `p` polar cells: `r * p` quads,
/// hexagons or diamonds, `2 * r * p` triangles. A zero count yields no cells.
///
/// # Errors
/// Returns [`GeomError::NonPositive`] unless `spacing > 0` and
/// [`GeomError::ParameterOutOfRange`] for a negative or non-finite inner
/// radius.
pub fn radial_grid(
    plane: Plane,
    kind: RadialGridKind,
    options: RadialGridOptions,
) -> GeomResult<Vec<Polyline>> {
    let spacing = positive("spacing", options.spacing)?;
    let inner_radius = options.inner_radius;
    if !inner_radius.is_finite() || inner_radius < 0.0 {
        return Err(GeomError::ParameterOutOfRange {
            name: "inner_radius",
            value: inner_radius,
            min: 0.0,
            max: f64::INFINITY,
        });
    }

    let radial = options.radial_count;
    let polar = options.polar_count;
    if radial == 0 || polar == 0 {
        return Ok(Vec::new());
    }

    let rings = RingLattice {
        plane,
        inner_radius,
        spacing,
    };
    let cells = match kind {
        RadialGridKind::Quad => quad_cells(&rings.points(radial + 1, polar, false)),
        RadialGridKind::Hexagon => hexagon_cells(&rings.points(radial + 2, polar * 4, true)),
        RadialGridKind::Triangle => triangle_cells(&rings.points(radial + 2, polar * 2, false)),
        RadialGridKind::Diamond => diamond_cells(&rings.points(radial + 2, polar * 2, false)),
    };
    log::debug!("{kind:?} radial grid: {} cells", cells.len());
    Ok(cells)
}

struct RingLattice {
    plane: Plane,
    inner_radius: f64,
    spacing: f64,
}

impl RingLattice {
    /// `ring_count` rings of `per_ring` points; `half_step` rotates every
    /// ring by half the angular step.
    #[allow(clippy::cast_precision_loss)]
    fn points(&self, ring_count: usize, per_ring: usize, half_step: bool) -> Vec<Vec<Point3>> {
        let step = TAU / per_ring as f64;
        let shift = if half_step { 0.5 * step } else { 0.0 };
        (0..ring_count)
            .map(|i| {
                let radius = self.inner_radius + self.spacing * i as f64;
                (0..per_ring)
                    .map(|j| {
                        let angle = shift + step * j as f64;
                        self.plane.point_at(radius * angle.sin(), radius * angle.cos())
                    })
                    .collect()
            })
            .collect()
    }
}

fn closed_cell(corners: &[Point3]) -> Polyline {
    let mut points = corners.to_vec();
    points.push(corners[0]);
    Polyline::from_points_unchecked(points)
}

fn quad_cells(rings: &[Vec<Point3>]) -> Vec<Polyline> {
    let n = rings[0].len();
    rings
        .windows(2)
        .flat_map(|band| {
            let (inner, outer) = (&band[0], &band[1]);
            (0..n).map(move |j| {
                let v = (j + 1) % n;
                closed_cell(&[inner[j], inner[v], outer[v], outer[j]])
            })
        })
        .collect()
}

fn hexagon_cells(rings: &[Vec<Point3>]) -> Vec<Polyline> {
    let n = rings[0].len();
    rings
        .windows(3)
        .enumerate()
        .flat_map(|(i, band)| {
            let bump = 2 * ((i + 1) % 2);
            (0..n).step_by(4).map(move |j| {
                let va = (j + bump) % n;
                let vb = (j + bump + 1) % n;
                let vc = (j + bump + 2) % n;
                let vd = (j + bump + 3) % n;
                closed_cell(&[
                    band[0][vb],
                    band[0][vc],
                    band[1][vd],
                    band[2][vc],
                    band[2][vb],
                    band[1][va],
                ])
            })
        })
        .collect()
}

/// Stagger indices `(va, vb, vc)` of the diamond whose inner tip sits on
/// ring `i` at column `j`.
const fn stagger(i: usize, j: usize, n: usize) -> (usize, usize, usize) {
    let bump = (i + 1) % 2;
    ((j + bump + 1) % n, (j + bump) % n, (j + bump + 2) % n)
}

fn triangle_cells(rings: &[Vec<Point3>]) -> Vec<Polyline> {
    let n = rings[0].len();
    rings
        .windows(3)
        .enumerate()
        .flat_map(|(i, band)| {
            (0..n).step_by(2).flat_map(move |j| {
                let (va, vb, vc) = stagger(i, j, n);
                [
                    closed_cell(&[band[0][va], band[1][vb], band[2][va]]),
                    closed_cell(&[band[0][va], band[2][va], band[1][vc]]),
                ]
            })
        })
        .collect()
}

fn diamond_cells(rings: &[Vec<Point3>]) -> Vec<Polyline> {
    let n = rings[0].len();
    rings
        .windows(3)
        .enumerate()
        .flat_map(|(i, band)| {
            (0..n).step_by(2).map(move |j| {
                let (va, vb, vc) = stagger(i, j, n);
                closed_cell(&[band[0][va], band[1][vb], band[2][va], band[1][vc]])
            })
        })
        .collect()
}
