//! Polyline refinement: corner cutting toward smooth limit curves.
//!
//! Every refinement step returns a fresh [`Polyline`]; closed inputs stay
//! closed by appending an explicit copy of the new first point.

use serde::{Deserialize, Serialize};

use super::core::{Point3, tween};
use super::curve::de_casteljau;
use super::error::{GeomError, GeomResult, iteration_count};
use super::polyline::Polyline;

// ============================================================================
// Degree 2 (Chaikin)
// ============================================================================

/// Chaikin corner cutting, `iterations` times.
///
/// Closed polylines double their vertex count each pass. Open polylines keep
/// their end points and refine as a clamped quadratic B-spline.
///
/// # Errors
/// Returns [`GeomError::NegativeIterations`] for `iterations < 0`.
pub fn degree2_smoothing(polyline: &Polyline, iterations: i32) -> GeomResult<Polyline> {
    let passes = iteration_count(iterations)?;
    let mut current = polyline.clone();
    for _ in 0..passes {
        current = Polyline::from_points_unchecked(chaikin_step(&current));
    }
    log::debug!(
        "degree-2 smoothing: {} -> {} points after {passes} passes",
        polyline.point_count(),
        current.point_count()
    );
    Ok(current)
}

fn chaikin_step(polyline: &Polyline) -> Vec<Point3> {
    if polyline.is_closed() {
        let verts = polyline.vertices();
        let n = verts.len();
        let mut out = Vec::with_capacity(2 * n + 1);
        for k in 0..n {
            let (a, b) = (verts[k], verts[(k + 1) % n]);
            out.push(tween(a, b, 0.25));
            out.push(tween(a, b, 0.75));
        }
        out.push(out[0]);
        return out;
    }

    let pts = polyline.points();
    let m = pts.len() - 1;
    let mut out = Vec::with_capacity(2 * m + 2);
    out.push(pts[0]);
    if m == 1 {
        out.push(tween(pts[0], pts[1], 0.5));
    } else {
        out.push(tween(pts[0], pts[1], 0.5));
        for k in 1..m - 1 {
            out.push(tween(pts[k], pts[k + 1], 0.25));
            out.push(tween(pts[k], pts[k + 1], 0.75));
        }
        out.push(tween(pts[m - 1], pts[m], 0.5));
    }
    out.push(pts[m]);
    out
}

// ============================================================================
// Degree 3
// ============================================================================

/// Cubic B-spline refinement, `iterations` times.
///
/// Each vertex is replaced by the average of its two quarter tweens toward
/// its neighbours, and a midpoint is inserted on every edge.
///
/// # Errors
/// Returns [`GeomError::NegativeIterations`] for `iterations < 0`.
pub fn degree3_smoothing(polyline: &Polyline, iterations: i32) -> GeomResult<Polyline> {
    let passes = iteration_count(iterations)?;
    let mut current = polyline.clone();
    for _ in 0..passes {
        current = Polyline::from_points_unchecked(cubic_step(&current));
    }
    log::debug!(
        "degree-3 smoothing: {} -> {} points after {passes} passes",
        polyline.point_count(),
        current.point_count()
    );
    Ok(current)
}

fn vertex_point(prev: Point3, vertex: Point3, next: Point3) -> Point3 {
    tween(tween(vertex, prev, 0.25), tween(vertex, next, 0.25), 0.5)
}

fn cubic_step(polyline: &Polyline) -> Vec<Point3> {
    if polyline.is_closed() {
        let verts = polyline.vertices();
        let n = verts.len();
        let mut out = Vec::with_capacity(2 * n + 1);
        for k in 0..n {
            let prev = verts[(k + n - 1) % n];
            let next = verts[(k + 1) % n];
            out.push(vertex_point(prev, verts[k], next));
            out.push(tween(verts[k], next, 0.5));
        }
        out.push(out[0]);
        return out;
    }

    let pts = polyline.points();
    let m = pts.len() - 1;
    let mut out = Vec::with_capacity(2 * m + 1);
    out.push(pts[0]);
    out.push(tween(pts[0], pts[1], 0.5));
    for k in 1..m {
        out.push(vertex_point(pts[k - 1], pts[k], pts[k + 1]));
        out.push(tween(pts[k], pts[k + 1], 0.5));
    }
    out.push(pts[m]);
    out
}

// ============================================================================
// Degree N
// ============================================================================

/// Sample the Bezier curve whose control polygon is the whole polyline.
///
/// The result holds `iterations * (point_count - 1) + 1` points evenly
/// spaced in parameter. A closed input yields a closed output.
///
/// # Errors
/// Returns [`GeomError::NegativeIterations`] for `iterations < 0`.
pub fn degree_n_smoothing(polyline: &Polyline, iterations: i32) -> GeomResult<Polyline> {
    let passes = iteration_count(iterations)?;
    if passes == 0 {
        return Ok(polyline.clone());
    }

    let control = polyline.points();
    let total = passes * (control.len() - 1);
    let mut out: Vec<Point3> = (0..=total)
        .map(|i| de_casteljau(control, i as f64 / total as f64))
        .collect();
    // The curve interpolates its end control points.
    out[total] = if polyline.is_closed() {
        out[0]
    } else {
        control[control.len() - 1]
    };
    log::debug!(
        "degree-n smoothing: degree {} sampled {} times",
        control.len() - 1,
        out.len()
    );
    Ok(Polyline::from_points_unchecked(out))
}

// ============================================================================
// Snub
// ============================================================================

/// Truncate every corner by cutting `t / 2` off both ends of each edge.
///
/// `t` is clamped to `[0, 1]`. At `t == 1` only edge midpoints remain. Open
/// polylines keep their end points.
///
/// # Errors
/// Returns [`GeomError::ParameterOutOfRange`] when `t` is not finite.
pub fn snub(polyline: &Polyline, t: f64) -> GeomResult<Polyline> {
    if !t.is_finite() {
        return Err(GeomError::ParameterOutOfRange {
            name: "t",
            value: t,
            min: 0.0,
            max: 1.0,
        });
    }
    let t = t.clamp(0.0, 1.0);
    let pts = polyline.points();
    let closed = polyline.is_closed();
    let first = pts[0];
    let last = pts[pts.len() - 1];

    let mut out = Vec::with_capacity(2 * pts.len() + 1);
    if t < 1.0 {
        for w in pts.windows(2) {
            out.push(tween(w[0], w[1], t / 2.0));
            out.push(tween(w[0], w[1], 1.0 - t / 2.0));
        }
        if !closed {
            let end = out.len() - 1;
            out[0] = first;
            out[end] = last;
        }
    } else {
        if !closed {
            out.push(first);
        }
        out.extend(pts.windows(2).map(|w| tween(w[0], w[1], 0.5)));
        if !closed {
            out.push(last);
        }
    }
    if closed {
        if out.len() < 3 {
            log::warn!("snub: closed result has fewer than 3 points, left open");
        } else {
            out.push(out[0]);
        }
    }
    Ok(Polyline::from_points_unchecked(out))
}

// ============================================================================
// Dispatcher
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SmoothingScheme {
    #[default]
    Degree2,
    Degree3,
    DegreeN,
}

/// Options for [`smooth_polyline`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothPolylineOptions {
    pub scheme: SmoothingScheme,
    /// Refinement passes; negative counts are rejected.
    pub iterations: i32,
}

impl SmoothPolylineOptions {
    #[must_use]
    pub const fn new(scheme: SmoothingScheme, iterations: i32) -> Self {
        Self { scheme, iterations }
    }

    #[must_use]
    pub const fn with_scheme(mut self, scheme: SmoothingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: i32) -> Self {
        self.iterations = iterations;
        self
    }
}

impl Default for SmoothPolylineOptions {
    fn default() -> Self {
        Self::new(SmoothingScheme::Degree2, 1)
    }
}

/// Diagnostics for smoothing operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SmoothPolylineDiagnostics {
    pub scheme: SmoothingScheme,
    pub input_point_count: usize,
    pub output_point_count: usize,
    pub iterations_applied: usize,
    pub closed: bool,
}

/// Run the selected refinement scheme.
///
/// # Errors
/// Returns [`GeomError::NegativeIterations`] for `iterations < 0`.
pub fn smooth_polyline(
    polyline: &Polyline,
    options: SmoothPolylineOptions,
) -> GeomResult<(Polyline, SmoothPolylineDiagnostics)> {
    let iterations = options.iterations;
    let result = match options.scheme {
        SmoothingScheme::Degree2 => degree2_smoothing(polyline, iterations)?,
        SmoothingScheme::Degree3 => degree3_smoothing(polyline, iterations)?,
        SmoothingScheme::DegreeN => degree_n_smoothing(polyline, iterations)?,
    };
    let diagnostics = SmoothPolylineDiagnostics {
        scheme: options.scheme,
        input_point_count: polyline.point_count(),
        output_point_count: result.point_count(),
        iterations_applied: iteration_count(iterations)?,
        closed: result.is_closed(),
    };
    Ok((result, diagnostics))
}
