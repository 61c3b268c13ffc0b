//! Topological edits on polylines: removal, mid-edge contraction, centroid
//! offset and fan decompositions.
//!
//! Vertex indices address distinct vertices (`0..vertex_count`), segment
//! indices address `0..segment_count` where a closed polyline's wraparound
//! segment is the last one. Index order and repeats never matter.

use std::collections::BTreeSet;

use super::backend::TessellationSolver;
use super::core::{Point3, Tolerance, tween};
use super::error::{BackendError, GeomError, GeomResult};
use super::polyline::Polyline;

// ============================================================================
// Removal
// ============================================================================

fn index_set(indices: &[usize], count: usize, kind: &'static str) -> GeomResult<BTreeSet<usize>> {
    let mut set = BTreeSet::new();
    for &index in indices {
        if index >= count {
            return Err(GeomError::IndexOutOfRange { kind, index, count });
        }
        set.insert(index);
    }
    Ok(set)
}

/// Turn a run of points into a polyline unless it is too short to matter.
fn keep_run(points: Vec<Point3>, closed: bool, tol: Tolerance) -> Option<Polyline> {
    let distinct = points.len();
    let polyline = if closed && distinct >= 3 {
        let mut points = points;
        points.push(points[0]);
        Polyline::from_points_unchecked(points)
    } else if distinct >= 2 {
        Polyline::from_points_unchecked(points)
    } else {
        return None;
    };
    if tol.is_zero_length(polyline.length()) {
        None
    } else {
        Some(polyline)
    }
}

/// Remove vertices by index.
///
/// With `collapse` the indexed vertices are deleted and the rest reconnected
/// into one polyline, closed if the input was and at least three vertices
/// remain. Without `collapse` the polyline is cut at every indexed vertex,
/// the cut vertex ending one run and starting the next; runs with fewer
/// than two points or no length are dropped.
///
/// # Errors
/// Returns [`GeomError::IndexOutOfRange`] for an index `>= vertex_count`.
pub fn remove_points_by_index(
    polyline: &Polyline,
    indices: &[usize],
    collapse: bool,
    tol: Tolerance,
) -> GeomResult<Vec<Polyline>> {
    let closed = polyline.is_closed_within(tol);
    let verts = polyline.vertices_within(tol);
    let removed = index_set(indices, verts.len(), "vertex")?;

    let result: Vec<Polyline> = if removed.is_empty() {
        vec![polyline.clone()]
    } else if collapse {
        let mut kept = verts.to_vec();
        for &index in removed.iter().rev() {
            kept.remove(index);
        }
        keep_run(kept, closed, tol).into_iter().collect()
    } else if closed {
        split_closed_at_vertices(verts, &removed, tol)
    } else {
        split_open_at_vertices(verts, &removed, tol)
    };

    log::debug!(
        "removed {} of {} vertices (collapse: {collapse}) -> {} polylines",
        removed.len(),
        verts.len(),
        result.len()
    );
    Ok(result)
}

fn split_open_at_vertices(verts: &[Point3], cuts: &BTreeSet<usize>, tol: Tolerance) -> Vec<Polyline> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for (index, &p) in verts.iter().enumerate() {
        run.push(p);
        if cuts.contains(&index) {
            out.extend(keep_run(std::mem::take(&mut run), false, tol));
            run.push(p);
        }
    }
    out.extend(keep_run(run, false, tol));
    out
}

fn split_closed_at_vertices(verts: &[Point3], cuts: &BTreeSet<usize>, tol: Tolerance) -> Vec<Polyline> {
    let n = verts.len();
    let Some(&first_cut) = cuts.first() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut run = vec![verts[first_cut]];
    for step in 1..=n {
        let index = (first_cut + step) % n;
        run.push(verts[index]);
        if cuts.contains(&index) {
            out.extend(keep_run(std::mem::take(&mut run), false, tol));
            run.push(verts[index]);
        }
    }
    out
}

/// Remove segments by index.
///
/// With `collapse` both end vertices of every indexed segment are removed
/// through [`remove_points_by_index`]. Without `collapse` the remaining
/// segments are returned as one polyline per contiguous run; a closed input
/// with no removals is returned unchanged.
///
/// # Errors
/// Returns [`GeomError::IndexOutOfRange`] for an index `>= segment_count`.
pub fn remove_segments_by_index(
    polyline: &Polyline,
    indices: &[usize],
    collapse: bool,
    tol: Tolerance,
) -> GeomResult<Vec<Polyline>> {
    let closed = polyline.is_closed_within(tol);
    let verts = polyline.vertices_within(tol);
    let n = verts.len();
    let segment_count = if closed { n } else { n - 1 };
    let removed = index_set(indices, segment_count, "segment")?;

    if removed.is_empty() {
        return Ok(vec![polyline.clone()]);
    }

    if collapse {
        let mut points: Vec<usize> = Vec::with_capacity(2 * removed.len());
        for &segment in &removed {
            points.push(segment);
            points.push((segment + 1) % n);
        }
        return remove_points_by_index(polyline, &points, true, tol);
    }

    let mut out = Vec::new();
    let mut run: Vec<Point3> = Vec::new();
    let flush = |run: &mut Vec<Point3>, out: &mut Vec<Polyline>| {
        out.extend(keep_run(std::mem::take(run), false, tol));
    };

    // Closed input starts walking right after the first removed segment so
    // that a run crossing the seam stays in one piece.
    let start = if closed {
        removed.first().map_or(0, |&s| s + 1)
    } else {
        0
    };
    for step in 0..segment_count {
        let segment = (start + step) % segment_count;
        if removed.contains(&segment) {
            flush(&mut run, &mut out);
            continue;
        }
        if run.is_empty() {
            run.push(verts[segment]);
        }
        run.push(verts[(segment + 1) % n]);
    }
    flush(&mut run, &mut out);

    log::debug!(
        "removed {} of {segment_count} segments -> {} polylines",
        removed.len(),
        out.len()
    );
    Ok(out)
}

// ============================================================================
// Mid-edge, offset
// ============================================================================

/// Polyline through the segment midpoints.
///
/// An input closed within `tol` always gives a closed output. An open output
/// has no wraparound midpoint; `close_output` only joins the last midpoint
/// back to the first.
///
/// # Errors
/// Returns [`GeomError::InsufficientSegments`] when the input has fewer than
/// two segments.
pub fn midedge(polyline: &Polyline, close_output: bool, tol: Tolerance) -> GeomResult<Polyline> {
    let segment_count = polyline.segment_count();
    if segment_count < 2 {
        return Err(GeomError::InsufficientSegments {
            required: 2,
            count: segment_count,
        });
    }
    let close = close_output || polyline.is_closed_within(tol);
    let mut mids: Vec<Point3> = polyline.segments().map(|seg| seg.midpoint()).collect();
    if close {
        if mids.len() < 3 {
            log::warn!("midedge: {} midpoints cannot form a closed polyline", mids.len());
        } else {
            mids.push(mids[0]);
        }
    }
    Ok(Polyline::from_points_unchecked(mids))
}

/// Move every vertex toward the centroid by fraction `t`.
///
/// `t = 0` leaves the polyline unchanged, `t = 1` collapses it onto the
/// centroid; other values interpolate or extrapolate.
///
/// # Errors
/// Returns [`GeomError::ParameterOutOfRange`] for a non-finite `t`.
pub fn offset_by_parameter(polyline: &Polyline, t: f64) -> GeomResult<Polyline> {
    if !t.is_finite() {
        return Err(GeomError::ParameterOutOfRange {
            name: "t",
            value: t,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        });
    }
    if t == 0.0 {
        return Ok(polyline.clone());
    }
    let center = polyline.center_point();
    let points = polyline
        .points()
        .iter()
        .map(|&p| tween(p, center, t))
        .collect();
    Ok(Polyline::from_points_unchecked(points))
}

// ============================================================================
// Fans
// ============================================================================

/// One closed triangle `[center, a, b, center]` per segment.
#[must_use]
pub fn triangular_fan(polyline: &Polyline) -> Vec<Polyline> {
    let center = polyline.center_point();
    polyline
        .segments()
        .map(|seg| Polyline::from_points_unchecked(vec![center, seg.start, seg.end, center]))
        .collect()
}

/// One closed quad per vertex between two segments: centroid, midpoint of
/// the incoming segment, the vertex, midpoint of the outgoing segment.
///
/// Only a polyline closed within `tol` wraps around; an open polyline yields
/// quads for its interior vertices.
#[must_use]
pub fn quadrangular_fan(polyline: &Polyline, tol: Tolerance) -> Vec<Polyline> {
    let center = polyline.center_point();
    let verts = polyline.vertices_within(tol);
    let n = verts.len();
    let quad = |prev: Point3, vertex: Point3, next: Point3| {
        Polyline::from_points_unchecked(vec![
            center,
            tween(prev, vertex, 0.5),
            vertex,
            tween(vertex, next, 0.5),
            center,
        ])
    };

    if polyline.is_closed_within(tol) {
        (0..n)
            .map(|i| quad(verts[(i + n - 1) % n], verts[i], verts[(i + 1) % n]))
            .collect()
    } else {
        verts.windows(3).map(|w| quad(w[0], w[1], w[2])).collect()
    }
}

// ============================================================================
// Triangulation
// ============================================================================

/// Triangulate the polygon bounded by the polyline, closing it first.
///
/// Each triangle comes back as a closed four-point polyline.
///
/// # Errors
/// Returns [`GeomError::InsufficientPoints`] for fewer than three distinct
/// vertices and [`GeomError::Backend`] when the solver fails or returns an
/// invalid index.
pub fn triangulate<S: TessellationSolver + ?Sized>(
    polyline: &Polyline,
    solver: &S,
    tol: Tolerance,
) -> GeomResult<Vec<Polyline>> {
    let closed = polyline.closed_copy(tol);
    let verts = closed.vertices();
    if verts.len() < 3 {
        return Err(GeomError::InsufficientPoints {
            required: 3,
            count: verts.len(),
        });
    }

    let triangles = solver.triangulate_closed_polygon(verts)?;
    let mut out = Vec::with_capacity(triangles.len());
    for [i, j, k] in triangles {
        let (Some(&a), Some(&b), Some(&c)) = (verts.get(i), verts.get(j), verts.get(k)) else {
            return Err(BackendError::Tessellation {
                reason: format!("triangle ({i}, {j}, {k}) indexes past {} vertices", verts.len()),
            }
            .into());
        };
        out.push(Polyline::from_points_unchecked(vec![a, b, c, a]));
    }
    log::debug!("triangulated {} vertices into {} triangles", verts.len(), out.len());
    Ok(out)
}
