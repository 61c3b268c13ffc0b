//! Default [`TessellationSolver`]: Delaunay for convex polygons, ear clipping
//! for everything else, and bounded Voronoi cells.
//!
//! Polygons are triangulated in the plane fitted through their vertices
//! (Newell normal), so planar polygons in any orientation work.

use super::backend::TessellationSolver;
use super::core::{BBox, Plane, Point3, Tolerance, Vec3, centroid};
use super::error::BackendError;
use super::polyline::Polyline;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Uv {
    u: f64,
    v: f64,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    idx: usize,
    point: Uv,
    prev: usize,
    next: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultTessellator {
    pub tolerance: Tolerance,
}

impl DefaultTessellator {
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl Default for DefaultTessellator {
    fn default() -> Self {
        Self::new(Tolerance::default_geom())
    }
}

impl TessellationSolver for DefaultTessellator {
    fn triangulate_closed_polygon(&self, points: &[Point3]) -> Result<Vec<[usize; 3]>, BackendError> {
        if points.len() < 3 {
            return Err(BackendError::Tessellation {
                reason: format!("polygon has {} vertices, need at least 3", points.len()),
            });
        }
        let uv = project_to_best_plane(points).ok_or_else(|| BackendError::Tessellation {
            reason: "polygon has no area".to_string(),
        })?;

        if is_convex(&uv, self.tolerance) {
            let triangles = delaunay(&uv);
            if !triangles.is_empty() {
                log::debug!("convex polygon: {} delaunay triangles", triangles.len());
                return Ok(triangles);
            }
        }

        let triangles = earclip(&uv, self.tolerance)?;
        log::debug!("ear clipping produced {} triangles", triangles.len());
        Ok(triangles)
    }

    fn voronoi_cells(&self, sites: &[Point3], boundary: BBox) -> Result<Vec<Polyline>, BackendError> {
        if sites.is_empty() {
            return Ok(Vec::new());
        }
        let size = boundary.size();
        if size.x <= self.tolerance.eps || size.y <= self.tolerance.eps {
            return Err(BackendError::Tessellation {
                reason: "voronoi boundary has no area".to_string(),
            });
        }
        if let Some(outside) = sites.iter().find(|p| {
            p.x < boundary.min.x || p.x > boundary.max.x || p.y < boundary.min.y || p.y > boundary.max.y
        }) {
            return Err(BackendError::Tessellation {
                reason: format!("site ({}, {}) lies outside the boundary", outside.x, outside.y),
            });
        }

        let uv: Vec<Uv> = sites.iter().map(|p| Uv { u: p.x, v: p.y }).collect();
        let rings = if uv.len() < 3 || all_collinear(&uv, self.tolerance) {
            log::debug!("voronoi: {} sites without a triangulation, clipping bisectors", uv.len());
            clipped_cells(&uv, boundary, self.tolerance)
        } else if let Some(rings) = voronoice_cells(&uv, boundary) {
            rings
        } else {
            log::warn!("voronoice failed on {} sites, clipping bisectors", uv.len());
            clipped_cells(&uv, boundary, self.tolerance)
        };

        let z = boundary.min.z;
        rings
            .into_iter()
            .map(|ring| {
                let points: Vec<Point3> = ring.iter().map(|p| Point3::new(p.u, p.v, z)).collect();
                Polyline::new_closed(points, self.tolerance).map_err(|e| BackendError::Tessellation {
                    reason: format!("degenerate voronoi cell: {e}"),
                })
            })
            .collect()
    }
}

// ============================================================================
// Voronoi
// ============================================================================

fn voronoice_cells(sites: &[Uv], boundary: BBox) -> Option<Vec<Vec<Uv>>> {
    let center = boundary.center();
    let size = boundary.size();
    let bounding_box = voronoice::BoundingBox::new(
        voronoice::Point {
            x: center.x,
            y: center.y,
        },
        size.x,
        size.y,
    );
    let voronoi = voronoice::VoronoiBuilder::default()
        .set_sites(sites.iter().map(|p| voronoice::Point { x: p.u, y: p.v }).collect())
        .set_bounding_box(bounding_box)
        .build()?;
    Some(
        voronoi
            .iter_cells()
            .map(|cell| cell.iter_vertices().map(|p| Uv { u: p.x, v: p.y }).collect())
            .collect(),
    )
}

/// True when every point lies on one line (or all coincide).
fn all_collinear(points: &[Uv], tol: Tolerance) -> bool {
    let Some(&a) = points.first() else {
        return true;
    };
    let Some(&b) = points.iter().find(|p| !approx_eq_uv(a, **p, tol)) else {
        return true;
    };
    points
        .iter()
        .all(|&c| distance_point_to_line_2d(a, c, b) <= tol.eps)
}

/// Cells built by cutting the boundary rectangle with the bisector of every
/// other site. Quadratic in the site count; coincident sites share a cell.
fn clipped_cells(sites: &[Uv], boundary: BBox, tol: Tolerance) -> Vec<Vec<Uv>> {
    let rect = vec![
        Uv { u: boundary.min.x, v: boundary.min.y },
        Uv { u: boundary.max.x, v: boundary.min.y },
        Uv { u: boundary.max.x, v: boundary.max.y },
        Uv { u: boundary.min.x, v: boundary.max.y },
    ];
    sites
        .iter()
        .enumerate()
        .map(|(i, &site)| {
            sites
                .iter()
                .enumerate()
                .filter(|&(j, &other)| j != i && !approx_eq_uv(site, other, tol))
                .fold(rect.clone(), |cell, (_, &other)| clip_to_bisector(&cell, site, other))
        })
        .collect()
}

/// Sutherland-Hodgman step keeping the part of `polygon` nearer `site` than `other`.
fn clip_to_bisector(polygon: &[Uv], site: Uv, other: Uv) -> Vec<Uv> {
    let du = other.u - site.u;
    let dv = other.v - site.v;
    let mid = Uv {
        u: 0.5 * (site.u + other.u),
        v: 0.5 * (site.v + other.v),
    };
    let side = |p: Uv| (p.u - mid.u) * du + (p.v - mid.v) * dv;

    let n = polygon.len();
    let mut out = Vec::with_capacity(n + 1);
    for k in 0..n {
        let a = polygon[k];
        let b = polygon[(k + 1) % n];
        let (sa, sb) = (side(a), side(b));
        if sa <= 0.0 {
            out.push(a);
        }
        if (sa < 0.0 && sb > 0.0) || (sa > 0.0 && sb < 0.0) {
            let t = sa / (sa - sb);
            out.push(Uv {
                u: a.u + (b.u - a.u) * t,
                v: a.v + (b.v - a.v) * t,
            });
        }
    }
    out
}

/// Newell normal of a closed vertex loop; its length is twice the area.
fn newell_normal(points: &[Point3]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::ZERO;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal = normal
            + Vec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
    }
    normal
}

fn project_to_best_plane(points: &[Point3]) -> Option<Vec<Uv>> {
    let origin = centroid(points)?;
    let plane = Plane::from_normal(origin, newell_normal(points))?;
    Some(
        points
            .iter()
            .map(|&p| {
                let (u, v) = plane.project(p);
                Uv { u, v }
            })
            .collect(),
    )
}

fn is_convex(points: &[Uv], tol: Tolerance) -> bool {
    let n = points.len();
    let mut sign = 0.0_f64;
    for i in 0..n {
        let cross = orient2d(points[i], points[(i + 1) % n], points[(i + 2) % n]);
        if cross.abs() <= tol.eps {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

fn delaunay(points: &[Uv]) -> Vec<[usize; 3]> {
    let delaunator_points: Vec<delaunator::Point> = points
        .iter()
        .map(|p| delaunator::Point { x: p.u, y: p.v })
        .collect();
    let triangulation = delaunator::triangulate(&delaunator_points);
    triangulation
        .triangles
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect()
}

// ============================================================================
// Ear clipping
// ============================================================================

fn earclip(points: &[Uv], tol: Tolerance) -> Result<Vec<[usize; 3]>, BackendError> {
    let len = points.len();
    let mut nodes: Vec<Node> = (0..len)
        .map(|i| Node {
            idx: i,
            point: points[i],
            prev: (i + len - 1) % len,
            next: (i + 1) % len,
        })
        .collect();

    let fail = |reason: &str| BackendError::Tessellation {
        reason: reason.to_string(),
    };

    let mut start = filter_ring_points(0, &mut nodes, tol).ok_or_else(|| fail("polygon degenerates after filtering"))?;
    let is_ccw = signed_area_ring(start, &nodes) > 0.0;
    let mut remaining = ring_len(start, &nodes);

    let mut ear = start;
    let mut stop = start;
    let mut triangles = Vec::with_capacity(remaining.saturating_sub(2));
    let mut passes_without_clip = 0usize;

    while remaining > 2 {
        let prev = nodes[ear].prev;
        let next = nodes[ear].next;
        if is_ear(prev, ear, next, &nodes, is_ccw, tol) {
            triangles.push([nodes[prev].idx, nodes[ear].idx, nodes[next].idx]);
            if ear == start {
                start = next;
            }
            remove_node(ear, &mut nodes);
            remaining -= 1;
            ear = next;
            stop = next;
            passes_without_clip = 0;
            continue;
        }

        ear = next;
        if ear == stop {
            passes_without_clip += 1;
            if passes_without_clip > 2 {
                return Err(fail("failed to triangulate polygon (no ears found)"));
            }
            start = filter_ring_points(start, &mut nodes, tol)
                .ok_or_else(|| fail("polygon degenerates during triangulation"))?;
            remaining = ring_len(start, &nodes);
            ear = start;
            stop = start;
        }
    }

    Ok(triangles)
}

fn ring_len(start: usize, nodes: &[Node]) -> usize {
    let mut count = 0usize;
    let mut cur = start;
    loop {
        count += 1;
        cur = nodes[cur].next;
        if cur == start || count > nodes.len() {
            break;
        }
    }
    count
}

/// Drop duplicate and collinear ring points; `None` when fewer than three
/// remain.
fn filter_ring_points(start: usize, nodes: &mut [Node], tol: Tolerance) -> Option<usize> {
    if ring_len(start, nodes) < 3 {
        return None;
    }

    let mut start = start;
    let mut cur = start;
    let mut guard = 0usize;

    loop {
        guard += 1;
        if guard > nodes.len().saturating_mul(4).max(16) {
            break;
        }

        let prev = nodes[cur].prev;
        let next = nodes[cur].next;
        let p = nodes[prev].point;
        let c = nodes[cur].point;
        let n = nodes[next].point;

        let dup = approx_eq_uv(p, c, tol) || approx_eq_uv(c, n, tol);
        let collinear = distance_point_to_line_2d(p, c, n) <= tol.eps;

        if dup || collinear {
            if cur == start {
                start = next;
            }
            remove_node(cur, nodes);
            cur = prev;
            if ring_len(start, nodes) < 3 {
                return None;
            }
        } else {
            cur = next;
        }

        if cur == start {
            break;
        }
    }

    Some(start)
}

fn is_ear(prev: usize, ear: usize, next: usize, nodes: &[Node], is_ccw: bool, tol: Tolerance) -> bool {
    let a = nodes[prev].point;
    let b = nodes[ear].point;
    let c = nodes[next].point;

    let cross = orient2d(a, b, c);
    if distance_point_to_line_2d(a, b, c) <= tol.eps {
        return false;
    }
    if (is_ccw && cross <= 0.0) || (!is_ccw && cross >= 0.0) {
        return false;
    }

    let mut p = nodes[next].next;
    let mut guard = 0usize;
    while p != prev {
        guard += 1;
        if guard > nodes.len() {
            break;
        }
        let pt = nodes[p].point;
        if point_in_triangle(a, b, c, pt, is_ccw, tol) {
            let cross_p = orient2d(nodes[nodes[p].prev].point, pt, nodes[nodes[p].next].point);
            let is_reflex = if is_ccw {
                cross_p <= tol.eps
            } else {
                cross_p >= -tol.eps
            };
            if is_reflex {
                return false;
            }
        }
        p = nodes[p].next;
    }

    true
}

fn signed_area_ring(start: usize, nodes: &[Node]) -> f64 {
    let mut area = 0.0;
    let mut p = start;
    loop {
        let q = nodes[p].next;
        let a = nodes[p].point;
        let b = nodes[q].point;
        area += a.u * b.v - b.u * a.v;
        p = q;
        if p == start {
            break;
        }
    }
    0.5 * area
}

fn remove_node(node: usize, nodes: &mut [Node]) {
    let prev = nodes[node].prev;
    let next = nodes[node].next;
    nodes[prev].next = next;
    nodes[next].prev = prev;
}

fn approx_eq_uv(a: Uv, b: Uv, tol: Tolerance) -> bool {
    (a.u - b.u).abs() <= tol.eps && (a.v - b.v).abs() <= tol.eps
}

fn orient2d(a: Uv, b: Uv, c: Uv) -> f64 {
    (b.u - a.u) * (c.v - a.v) - (b.v - a.v) * (c.u - a.u)
}

fn point_in_triangle(a: Uv, b: Uv, c: Uv, p: Uv, is_ccw: bool, tol: Tolerance) -> bool {
    let ab = orient2d(a, b, p);
    let bc = orient2d(b, c, p);
    let ca = orient2d(c, a, p);

    if is_ccw {
        ab >= -tol.eps && bc >= -tol.eps && ca >= -tol.eps
    } else {
        ab <= tol.eps && bc <= tol.eps && ca <= tol.eps
    }
}

fn distance_point_to_line_2d(a: Uv, p: Uv, b: Uv) -> f64 {
    let du = b.u - a.u;
    let dv = b.v - a.v;
    let len = du.hypot(dv);
    if len <= f64::EPSILON {
        return (p.u - a.u).hypot(p.v - a.v);
    }
    ((p.u - a.u) * dv - (p.v - a.v) * du).abs() / len
}
