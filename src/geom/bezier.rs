//! Reference curve backend: piecewise Bezier curves.
//!
//! A [`PolyCurve`] is a chain of [`BezierSpan`]s, each mapped onto its own
//! interval of a global domain by the `breaks` vector. Polylines become
//! degree-1 spans, blends become degree 1, 3 or 5 spans depending on the
//! requested continuity.

use serde::Serialize;

use super::backend::{BlendEnd, CurveBackend};
use super::core::{Point3, Tolerance, Vec3};
use super::curve::{BezierSpan, Curve3};
use super::error::{BackendError, GeomError, GeomResult};
use super::polyline::{ControlPolygon, Polyline};

/// Bisection steps for arc-length inversion; halves the bracket each time.
const INV_ARCLEN_STEPS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct PolyCurve {
    spans: Vec<BezierSpan>,
    breaks: Vec<f64>,
}

impl PolyCurve {
    /// Build from spans and their parameter breaks.
    ///
    /// # Errors
    /// Returns [`GeomError::InsufficientSegments`] for an empty span list and
    /// [`GeomError::ParameterOutOfRange`] when `breaks` is not strictly
    /// increasing with one entry more than `spans`.
    pub fn new(spans: Vec<BezierSpan>, breaks: Vec<f64>) -> GeomResult<Self> {
        if spans.is_empty() {
            return Err(GeomError::InsufficientSegments {
                required: 1,
                count: 0,
            });
        }
        let increasing = breaks.windows(2).all(|w| w[1] > w[0]);
        if breaks.len() != spans.len() + 1 || !increasing || breaks.iter().any(|b| !b.is_finite()) {
            return Err(GeomError::ParameterOutOfRange {
                name: "breaks",
                value: breaks.len() as f64,
                min: (spans.len() + 1) as f64,
                max: (spans.len() + 1) as f64,
            });
        }
        Ok(Self { spans, breaks })
    }

    /// Chain the spans over `[0, 1]`, each taking a share of the domain
    /// proportional to its arc length. Degenerate spans are dropped.
    ///
    /// # Errors
    /// Returns [`GeomError::InsufficientSegments`] when every span is
    /// degenerate.
    pub fn from_spans(spans: Vec<BezierSpan>) -> GeomResult<Self> {
        let tol = Tolerance::ZERO_LENGTH;
        let spans: Vec<BezierSpan> = spans.into_iter().filter(|s| !s.is_degenerate(tol)).collect();
        let lengths: Vec<f64> = spans.iter().map(BezierSpan::arc_length).collect();
        let total: f64 = lengths.iter().sum();
        let mut breaks = Vec::with_capacity(spans.len() + 1);
        breaks.push(0.0);
        let mut acc = 0.0;
        for (i, len) in lengths.iter().enumerate() {
            acc += len;
            breaks.push(if total > 0.0 {
                acc / total
            } else {
                (i + 1) as f64 / spans.len() as f64
            });
        }
        if let Some(last) = breaks.last_mut() {
            *last = 1.0;
        }
        Self::new(spans, breaks)
    }

    /// Degree-1 curve through the polyline's points, chord-length parameterized.
    ///
    /// # Errors
    /// Returns [`GeomError::InsufficientSegments`] when all points coincide.
    pub fn from_polyline(polyline: &Polyline) -> GeomResult<Self> {
        Self::from_spans(
            polyline
                .segments()
                .map(|seg| BezierSpan::line(seg.start, seg.end))
                .collect(),
        )
    }

    #[must_use]
    pub fn spans(&self) -> &[BezierSpan] {
        &self.spans
    }

    #[must_use]
    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    #[must_use]
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    #[must_use]
    pub fn start_point(&self) -> Point3 {
        self.spans[0].start()
    }

    #[must_use]
    pub fn end_point(&self) -> Point3 {
        self.spans[self.spans.len() - 1].end()
    }

    #[must_use]
    pub fn is_closed_within(&self, tol: Tolerance) -> bool {
        let loops = self.spans.len() > 1 || self.spans[0].degree() > 1;
        loops && tol.approx_eq_point3(self.start_point(), self.end_point())
    }

    /// Span index and local span parameter for the global parameter `t`.
    fn locate(&self, t: f64) -> (usize, f64) {
        let last = self.spans.len() - 1;
        let index = self.breaks[1..self.breaks.len() - 1]
            .iter()
            .position(|&b| t < b)
            .unwrap_or(last);
        let (a, b) = (self.breaks[index], self.breaks[index + 1]);
        (index, (t - a) / (b - a))
    }

    fn span_scale(&self, index: usize) -> f64 {
        1.0 / (self.breaks[index + 1] - self.breaks[index])
    }

    /// Map the domain linearly onto `[t0, t1]`.
    #[must_use]
    pub fn with_domain(&self, t0: f64, t1: f64) -> Self {
        let (a, b) = self.domain();
        let scale = (t1 - t0) / (b - a);
        let breaks = self.breaks.iter().map(|x| t0 + (x - a) * scale).collect();
        Self {
            spans: self.spans.clone(),
            breaks,
        }
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let (a, b) = self.domain();
        let spans = self.spans.iter().rev().map(BezierSpan::reversed).collect();
        let breaks = self.breaks.iter().rev().map(|x| a + b - x).collect();
        Self { spans, breaks }
    }

    /// Portion between global parameters `t0 < t1`, keeping their values as
    /// the new domain.
    #[must_use]
    pub fn sub_curve(&self, t0: f64, t1: f64) -> Self {
        let (i0, u0) = self.locate(t0);
        let (i1, u1) = self.locate(t1);
        // An end landing exactly on a break belongs to the earlier span.
        let (i1, u1) = if i1 > i0 && u1 <= 0.0 {
            (i1 - 1, 1.0)
        } else {
            (i1, u1)
        };

        let mut spans = Vec::with_capacity(i1 - i0 + 1);
        let mut breaks = Vec::with_capacity(i1 - i0 + 2);
        breaks.push(t0);
        for index in i0..=i1 {
            let lo = if index == i0 { u0 } else { 0.0 };
            let hi = if index == i1 { u1 } else { 1.0 };
            let span = &self.spans[index];
            spans.push(if lo <= 0.0 && hi >= 1.0 {
                span.clone()
            } else {
                span.sub_span(lo, hi)
            });
            breaks.push(if index == i1 { t1 } else { self.breaks[index + 1] });
        }
        Self { spans, breaks }
    }

    /// Arc length between two global parameters.
    #[must_use]
    pub fn length_between(&self, t0: f64, t1: f64) -> f64 {
        let (i0, u0) = self.locate(t0);
        let (i1, u1) = self.locate(t1);
        (i0..=i1)
            .map(|index| {
                let lo = if index == i0 { u0 } else { 0.0 };
                let hi = if index == i1 { u1 } else { 1.0 };
                self.spans[index].arc_length_between(lo, hi)
            })
            .sum()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.spans.iter().map(BezierSpan::arc_length).sum()
    }

    /// Global parameter at arc length `distance` from the start.
    #[must_use]
    pub fn parameter_at_length(&self, distance: f64) -> Option<f64> {
        if !distance.is_finite() || distance < 0.0 {
            return None;
        }
        let total = self.length();
        if distance > total + Tolerance::LOOSE.eps {
            return None;
        }
        let mut remaining = distance.min(total);
        for (index, span) in self.spans.iter().enumerate() {
            let span_len = span.arc_length();
            if remaining <= span_len || index + 1 == self.spans.len() {
                let local = invert_arc_length(span, remaining.min(span_len));
                let (a, b) = (self.breaks[index], self.breaks[index + 1]);
                return Some(a + (b - a) * local);
            }
            remaining -= span_len;
        }
        None
    }

    /// Every control point of every span; shared joints appear once.
    #[must_use]
    pub fn control_points(&self) -> Vec<Point3> {
        let mut points = Vec::new();
        for span in &self.spans {
            let control = span.control_points();
            let skip = usize::from(!points.is_empty());
            points.extend_from_slice(&control[skip..]);
        }
        points
    }

    /// Shift the domain so that it starts at `t0`.
    fn shifted_to(&self, t0: f64) -> Self {
        let offset = t0 - self.breaks[0];
        Self {
            spans: self.spans.clone(),
            breaks: self.breaks.iter().map(|b| b + offset).collect(),
        }
    }

    /// Append `other` at this curve's end, snapping its start onto our end.
    fn append(&mut self, other: &Self) {
        let end = self.end_point();
        let other = other.shifted_to(self.breaks[self.breaks.len() - 1]);
        for (k, span) in other.spans.iter().enumerate() {
            let mut control = span.control_points().to_vec();
            if k == 0 {
                control[0] = end;
            }
            self.spans.push(BezierSpan::from_control_unchecked(control));
        }
        self.breaks.extend_from_slice(&other.breaks[1..]);
    }

    fn snap_closed(&mut self, tol: Tolerance) {
        if self.is_closed_within(tol) {
            let start = self.start_point();
            let last = self.spans.len() - 1;
            let mut control = self.spans[last].control_points().to_vec();
            let end = control.len() - 1;
            control[end] = start;
            self.spans[last] = BezierSpan::from_control_unchecked(control);
        }
    }
}

impl Curve3 for PolyCurve {
    fn point_at(&self, t: f64) -> Point3 {
        let (index, u) = self.locate(t);
        self.spans[index].point_at(u)
    }

    fn domain(&self) -> (f64, f64) {
        (self.breaks[0], self.breaks[self.breaks.len() - 1])
    }

    fn is_closed(&self) -> bool {
        self.is_closed_within(Tolerance::default_geom())
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let (index, u) = self.locate(t);
        self.spans[index].derivative_at(u) * self.span_scale(index)
    }

    fn second_derivative_at(&self, t: f64) -> Vec3 {
        let (index, u) = self.locate(t);
        let scale = self.span_scale(index);
        self.spans[index].second_derivative_at(u) * (scale * scale)
    }
}

impl ControlPolygon for PolyCurve {
    fn to_control_polygon(&self) -> Polyline {
        Polyline::from_points_unchecked(self.control_points())
    }

    fn from_control_polygon(polygon: &Polyline) -> GeomResult<Self> {
        Self::from_polyline(polygon)
    }
}

/// Local span parameter at arc length `target` by bisection.
fn invert_arc_length(span: &BezierSpan, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..INV_ARCLEN_STEPS {
        let mid = 0.5 * (lo + hi);
        if span.arc_length_between(0.0, mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

// ============================================================================
// Backend
// ============================================================================

/// Statistics from [`BezierBackend::join_with_diagnostics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinCurvesDiagnostics {
    pub input_curve_count: usize,
    pub output_curve_count: usize,
    pub join_count: usize,
}

/// [`CurveBackend`] over [`PolyCurve`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierBackend {
    /// Endpoint matching and closedness tolerance.
    pub tolerance: Tolerance,
}

impl BezierBackend {
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Greedily chain touching curves; the first curve of each chain keeps
    /// its direction.
    #[must_use]
    pub fn join_with_diagnostics(&self, curves: &[PolyCurve]) -> (Vec<PolyCurve>, JoinCurvesDiagnostics) {
        let mut diagnostics = JoinCurvesDiagnostics {
            input_curve_count: curves.len(),
            ..Default::default()
        };

        let mut remaining: Vec<PolyCurve> = curves.to_vec();
        remaining.reverse();
        let mut result = Vec::new();

        while let Some(mut current) = remaining.pop() {
            let mut changed = true;
            while changed && !current.is_closed_within(self.tolerance) {
                changed = false;
                // Scan in input order so chains follow the caller's sequence.
                let mut index = remaining.len();
                while index > 0 {
                    index -= 1;
                    if let Some(merged) = self.try_merge(&current, &remaining[index]) {
                        current = merged;
                        remaining.remove(index);
                        diagnostics.join_count += 1;
                        changed = true;
                        break;
                    }
                }
            }
            current.snap_closed(self.tolerance);
            result.push(current);
        }

        diagnostics.output_curve_count = result.len();
        log::debug!(
            "joined {} curves into {} ({} joins)",
            diagnostics.input_curve_count,
            diagnostics.output_curve_count,
            diagnostics.join_count
        );
        (result, diagnostics)
    }

    fn try_merge(&self, target: &PolyCurve, candidate: &PolyCurve) -> Option<PolyCurve> {
        let tol = self.tolerance;
        let start = target.start_point();
        let end = target.end_point();

        // Case 1: end of target meets start of candidate
        if tol.approx_eq_point3(end, candidate.start_point()) {
            let mut merged = target.clone();
            merged.append(candidate);
            return Some(merged);
        }

        // Case 2: end of target meets end of candidate (reverse candidate)
        if tol.approx_eq_point3(end, candidate.end_point()) {
            let mut merged = target.clone();
            merged.append(&candidate.reversed());
            return Some(merged);
        }

        // Case 3: start of target meets end of candidate
        if tol.approx_eq_point3(start, candidate.end_point()) {
            let mut merged = candidate.clone();
            merged.append(target);
            return Some(merged);
        }

        // Case 4: start of target meets start of candidate (reverse candidate)
        if tol.approx_eq_point3(start, candidate.start_point()) {
            let mut merged = candidate.reversed();
            merged.append(target);
            return Some(merged);
        }

        None
    }
}

impl Default for BezierBackend {
    fn default() -> Self {
        Self::new(Tolerance::LOOSE)
    }
}

/// Position, unit tangent and curvature vector where a blend leaves a curve.
struct EndFrame {
    point: Point3,
    tangent: Vec3,
    curvature: Vec3,
}

fn end_frame(end: &BlendEnd<'_, PolyCurve>) -> Result<EndFrame, BackendError> {
    let curve = end.curve;
    let (a, b) = curve.domain();
    let t = end.parameter;
    if !(a..=b).contains(&t) {
        return Err(BackendError::Blend {
            reason: format!("parameter {t} outside curve domain [{a}, {b}]"),
        });
    }
    let d1 = curve.derivative_at(t);
    let speed_sq = d1.length_squared();
    let Some(tangent) = d1.normalized() else {
        return Err(BackendError::Blend {
            reason: format!("zero derivative at parameter {t}"),
        });
    };
    let d2 = curve.second_derivative_at(t);
    let curvature = (d2 - tangent * d2.dot(tangent)) / speed_sq;
    Ok(EndFrame {
        point: curve.point_at(t),
        tangent: if end.reversed { -tangent } else { tangent },
        curvature,
    })
}

impl CurveBackend for BezierBackend {
    type Curve = PolyCurve;

    fn reparameterize_unit(&self, curve: &PolyCurve) -> PolyCurve {
        curve.with_domain(0.0, 1.0)
    }

    fn reverse(&self, curve: &PolyCurve) -> PolyCurve {
        curve.reversed()
    }

    /// Parameters at the domain ends produce no cut.
    fn split(&self, curve: &PolyCurve, parameters: &[f64]) -> Result<Vec<PolyCurve>, BackendError> {
        let (a, b) = curve.domain();
        let eps = Tolerance::ZERO_LENGTH.eps * (b - a).abs().max(1.0);
        let mut cuts = vec![a];
        for &parameter in parameters {
            if !parameter.is_finite() || parameter < a - eps || parameter > b + eps {
                return Err(BackendError::SplitParameter { parameter });
            }
            let last = cuts[cuts.len() - 1];
            if parameter > last + eps && parameter < b - eps {
                cuts.push(parameter);
            }
        }
        cuts.push(b);
        Ok(cuts
            .windows(2)
            .map(|w| curve.sub_curve(w[0], w[1]))
            .collect())
    }

    fn length(&self, curve: &PolyCurve) -> f64 {
        curve.length()
    }

    fn length_parameter(&self, curve: &PolyCurve, distance: f64) -> Option<f64> {
        curve.parameter_at_length(distance)
    }

    fn create_blend_curve(
        &self,
        start: BlendEnd<'_, PolyCurve>,
        end: BlendEnd<'_, PolyCurve>,
    ) -> Result<PolyCurve, BackendError> {
        let fa = end_frame(&start)?;
        let fb = end_frame(&end)?;
        let chord = fa.point.distance_to(fb.point);
        if chord <= self.tolerance.eps {
            return Err(BackendError::Blend {
                reason: format!("blend ends coincide (distance {chord})"),
            });
        }

        let ca = start.continuity.end_constraints();
        let cb = end.continuity.end_constraints();
        let degree = ca + cb - 1;
        let n = degree as f64;
        let arm_a = start.bulge * chord;
        let arm_b = end.bulge * chord;

        let mut head = vec![fa.point];
        if ca >= 2 {
            head.push(fa.point + fa.tangent * (arm_a / n));
        }
        if ca >= 3 {
            let p1 = head[1];
            head.push(p1 + (p1 - fa.point) + fa.curvature * (arm_a * arm_a / (n * (n - 1.0))));
        }

        let mut tail = vec![fb.point];
        if cb >= 2 {
            tail.push(fb.point + fb.tangent * (arm_b / n));
        }
        if cb >= 3 {
            let p1 = tail[1];
            tail.push(p1 + (p1 - fb.point) + fb.curvature * (arm_b * arm_b / (n * (n - 1.0))));
        }
        tail.reverse();
        head.extend(tail);

        let span = BezierSpan::new(head).map_err(|e| BackendError::Blend {
            reason: e.to_string(),
        })?;
        PolyCurve::new(vec![span], vec![0.0, 1.0]).map_err(|e| BackendError::Blend {
            reason: e.to_string(),
        })
    }

    fn join_curves(&self, curves: &[PolyCurve]) -> Vec<PolyCurve> {
        self.join_with_diagnostics(curves).0
    }

    fn segments(&self, curve: &PolyCurve) -> Vec<PolyCurve> {
        curve
            .spans
            .iter()
            .zip(curve.breaks.windows(2))
            .map(|(span, w)| PolyCurve {
                spans: vec![span.clone()],
                breaks: vec![w[0], w[1]],
            })
            .collect()
    }

    fn is_closed(&self, curve: &PolyCurve) -> bool {
        curve.is_closed_within(self.tolerance)
    }
}
