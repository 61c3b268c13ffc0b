//! Apply one operation to many independent inputs.
//!
//! With the `parallel` feature the inputs are spread over the rayon thread
//! pool; results always come back in input order, one per input.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::backend::{CurveBackend, TessellationSolver};
use super::blend::{CornerBlendDiagnostics, CornerBlendOptions, CornerInset, blend_corners};
use super::core::Tolerance;
use super::error::GeomResult;
use super::polyline::Polyline;
use super::smooth::{SmoothPolylineDiagnostics, SmoothPolylineOptions, smooth_polyline};
use super::topology::triangulate;

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        /// Bound on everything shared with batch workers.
        pub trait BatchSafe: Send + Sync {}
        impl<T: Send + Sync + ?Sized> BatchSafe for T {}
    } else {
        /// Bound on everything shared with batch workers.
        pub trait BatchSafe {}
        impl<T: ?Sized> BatchSafe for T {}
    }
}

#[cfg(feature = "parallel")]
fn map_all<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: BatchSafe,
    R: BatchSafe,
    F: Fn(&T) -> R + BatchSafe,
{
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_all<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: BatchSafe,
    R: BatchSafe,
    F: Fn(&T) -> R + BatchSafe,
{
    items.iter().map(f).collect()
}

pub fn smooth_polylines(
    polylines: &[Polyline],
    options: SmoothPolylineOptions,
) -> Vec<GeomResult<(Polyline, SmoothPolylineDiagnostics)>> {
    log::debug!("smoothing {} polylines", polylines.len());
    map_all(polylines, |polyline| smooth_polyline(polyline, options))
}

pub fn triangulate_polylines<S>(
    polylines: &[Polyline],
    solver: &S,
    tol: Tolerance,
) -> Vec<GeomResult<Vec<Polyline>>>
where
    S: TessellationSolver + BatchSafe + ?Sized,
{
    map_all(polylines, |polyline| triangulate(polyline, solver, tol))
}

pub fn blend_corners_batch<B>(
    backend: &B,
    curves: &[B::Curve],
    inset: CornerInset,
    options: CornerBlendOptions,
) -> Vec<GeomResult<(B::Curve, CornerBlendDiagnostics)>>
where
    B: CurveBackend + BatchSafe + ?Sized,
    B::Curve: BatchSafe,
{
    log::debug!("blending corners of {} curves", curves.len());
    map_all(curves, |curve| blend_corners(backend, curve, inset, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::bezier::{BezierBackend, PolyCurve};
    use crate::geom::smooth::SmoothingScheme;
    use crate::geom::tessellate::DefaultTessellator;

    fn triangle(offset: f64) -> Polyline {
        Polyline::from_coords(&[
            [offset, 0.0, 0.0],
            [offset + 1.0, 0.0, 0.0],
            [offset, 1.0, 0.0],
            [offset, 0.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn batch_results_keep_input_order() {
        let inputs: Vec<Polyline> = (0..8).map(|i| triangle(f64::from(i))).collect();
        let options = SmoothPolylineOptions::new(SmoothingScheme::Degree3, 1);
        let results = smooth_polylines(&inputs, options);
        assert_eq!(results.len(), 8);
        for (i, result) in results.iter().enumerate() {
            let (out, _) = result.as_ref().unwrap();
            assert!((out.center_point().x - (i as f64 + 1.0 / 3.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn batch_triangulation_and_blending() {
        let inputs: Vec<Polyline> = (0..3).map(|i| triangle(f64::from(i) * 5.0)).collect();
        let tris = triangulate_polylines(&inputs, &DefaultTessellator::default(), Tolerance::default_geom());
        assert!(tris.iter().all(|r| r.as_ref().map(Vec::len) == Ok(1)));

        let backend = BezierBackend::default();
        let curves: Vec<PolyCurve> = inputs.iter().map(|p| PolyCurve::from_polyline(p).unwrap()).collect();
        let blended = blend_corners_batch(
            &backend,
            &curves,
            CornerInset::Parameter(0.5),
            CornerBlendOptions::default(),
        );
        assert!(blended.iter().all(|r| r.as_ref().is_ok_and(|(_, d)| d.closed)));
    }
}
