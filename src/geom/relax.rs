//! Lloyd relaxation of point sites inside a rectangle.

use serde::Serialize;

use super::backend::TessellationSolver;
use super::core::{BBox, Point3};
use super::error::{GeomError, GeomResult, iteration_count};
use super::polyline::Polyline;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LloydDiagnostics {
    pub site_count: usize,
    /// Number of diagrams solved.
    pub iterations_applied: usize,
    /// Largest distance a site moved before the last diagram was solved.
    pub max_displacement: f64,
}

/// Solve the Voronoi diagram of the sites `iterations` times, moving every
/// site to the centre point of its cell between solves, and return the cells
/// of the last diagram in site order.
///
/// One iteration yields the diagram of the input sites; zero yields no cells.
///
/// # Errors
/// Returns [`GeomError::NegativeIterations`] for `iterations < 0`,
/// [`GeomError::InsufficientPoints`] without sites and [`GeomError::Backend`]
/// when the solver fails.
pub fn lloyd_relaxation<S: TessellationSolver + ?Sized>(
    sites: &[Point3],
    boundary: BBox,
    iterations: i32,
    solver: &S,
) -> GeomResult<(Vec<Polyline>, LloydDiagnostics)> {
    let passes = iteration_count(iterations)?;
    if sites.is_empty() {
        return Err(GeomError::InsufficientPoints {
            required: 1,
            count: 0,
        });
    }

    let mut diagnostics = LloydDiagnostics {
        site_count: sites.len(),
        ..Default::default()
    };
    let mut current = sites.to_vec();
    let mut cells = Vec::new();

    for pass in 0..passes {
        if pass > 0 {
            let centers: Vec<Point3> = cells.iter().map(Polyline::center_point).collect();
            diagnostics.max_displacement = current
                .iter()
                .zip(&centers)
                .map(|(a, b)| a.distance_to(*b))
                .fold(0.0, f64::max);
            current = centers;
        }
        cells = solver.voronoi_cells(&current, boundary)?;
        diagnostics.iterations_applied += 1;
    }

    log::debug!(
        "lloyd relaxation: {} sites, {} passes, last displacement {}",
        diagnostics.site_count,
        diagnostics.iterations_applied,
        diagnostics.max_displacement
    );
    Ok((cells, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tessellate::DefaultTessellator;

    #[test]
    fn relaxation_spreads_clustered_sites() {
        let boundary = BBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 0.0));
        let sites = vec![
            Point3::new(4.9, 5.0, 0.0),
            Point3::new(5.1, 5.0, 0.0),
            Point3::new(5.0, 5.2, 0.0),
        ];
        let solver = DefaultTessellator::default();
        let (cells, diag) = lloyd_relaxation(&sites, boundary, 5, &solver).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(diag.iterations_applied, 5);
        let centers: Vec<Point3> = cells.iter().map(Polyline::center_point).collect();
        assert!(centers[0].distance_to(centers[1]) > 1.0);
    }

    #[test]
    fn negative_iterations_fail() {
        let boundary = BBox::new(Point3::ORIGIN, Point3::new(1.0, 1.0, 0.0));
        let solver = DefaultTessellator::default();
        assert!(matches!(
            lloyd_relaxation(&[Point3::new(0.5, 0.5, 0.0)], boundary, -1, &solver),
            Err(GeomError::NegativeIterations { iterations: -1 })
        ));
    }

    #[test]
    fn zero_iterations_yield_no_cells() {
        let boundary = BBox::new(Point3::ORIGIN, Point3::new(1.0, 1.0, 0.0));
        let solver = DefaultTessellator::default();
        let (cells, diag) =
            lloyd_relaxation(&[Point3::new(0.5, 0.5, 0.0)], boundary, 0, &solver).unwrap();
        assert!(cells.is_empty());
        assert_eq!(diag.iterations_applied, 0);
    }

    #[test]
    fn two_sites_relax_to_the_quarter_points() {
        let boundary = BBox::new(Point3::ORIGIN, Point3::new(4.0, 2.0, 0.0));
        let sites = vec![Point3::new(0.5, 1.0, 0.0), Point3::new(1.5, 1.0, 0.0)];
        let solver = DefaultTessellator::default();
        let (cells, diag) = lloyd_relaxation(&sites, boundary, 30, &solver).unwrap();
        assert_eq!(cells.len(), 2);
        assert!(diag.max_displacement < 1e-3);
        assert!((cells[0].center_point().x - 1.0).abs() < 1e-3);
        assert!((cells[1].center_point().x - 3.0).abs() < 1e-3);
    }
}
