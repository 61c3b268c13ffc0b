use super::core::{Point3, Tolerance, Vec3};
use super::error::{GeomError, GeomResult};

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn is_closed(&self) -> bool {
        false
    }

    fn derivative_at(&self, t: f64) -> Vec3;

    fn second_derivative_at(&self, t: f64) -> Vec3;

    #[must_use]
    fn curvature_at(&self, t: f64) -> Option<f64> {
        let d1 = self.derivative_at(t);
        let d2 = self.second_derivative_at(t);
        let denom = d1.length();
        if denom <= 0.0 || !denom.is_finite() {
            return None;
        }
        let num = d1.cross(d2).length();
        let k = num / (denom * denom * denom);
        if k.is_finite() { Some(k) } else { None }
    }

    #[must_use]
    fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.derivative_at(t).normalized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.direction().length()
    }

    #[must_use]
    pub fn midpoint(self) -> Point3 {
        self.start.lerp(self.end, 0.5)
    }
}

impl Curve3 for Line3 {
    fn point_at(&self, t: f64) -> Point3 {
        let dir = self.direction();
        self.start.add_vec(dir.mul_scalar(t))
    }

    fn derivative_at(&self, _t: f64) -> Vec3 {
        self.direction()
    }

    fn second_derivative_at(&self, _t: f64) -> Vec3 {
        Vec3::ZERO
    }
}

/// Bezier span of arbitrary degree over the unit domain.
///
/// Degree is `control.len() - 1`; a two-point span is a straight line.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierSpan {
    control: Vec<Point3>,
}

impl BezierSpan {
    /// # Errors
    /// Returns [`GeomError::InsufficientPoints`] for fewer than two control
    /// points.
    pub fn new(control: Vec<Point3>) -> GeomResult<Self> {
        if control.len() < 2 {
            return Err(GeomError::InsufficientPoints {
                required: 2,
                count: control.len(),
            });
        }
        Ok(Self { control })
    }

    /// Wrap control points already known to hold at least two entries.
    pub(crate) fn from_control_unchecked(control: Vec<Point3>) -> Self {
        debug_assert!(control.len() >= 2);
        Self { control }
    }

    #[must_use]
    pub fn line(start: Point3, end: Point3) -> Self {
        Self {
            control: vec![start, end],
        }
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.control.len() - 1
    }

    #[must_use]
    pub fn start(&self) -> Point3 {
        self.control[0]
    }

    #[must_use]
    pub fn end(&self) -> Point3 {
        self.control[self.control.len() - 1]
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut control = self.control.clone();
        control.reverse();
        Self { control }
    }

    /// Split at `t` with de Casteljau's scheme; both halves keep the degree.
    #[must_use]
    pub fn split_at(&self, t: f64) -> (Self, Self) {
        let n = self.control.len();
        let mut work = self.control.clone();
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        left.push(work[0]);
        right.push(work[n - 1]);
        for level in 1..n {
            for i in 0..n - level {
                work[i] = work[i].lerp(work[i + 1], t);
            }
            left.push(work[0]);
            right.push(work[n - level - 1]);
        }
        right.reverse();
        (Self { control: left }, Self { control: right })
    }

    /// Portion of the span between `t0` and `t1`, with `t0 < t1`.
    #[must_use]
    pub fn sub_span(&self, t0: f64, t1: f64) -> Self {
        let tail = if t0 <= 0.0 {
            self.clone()
        } else {
            self.split_at(t0).1
        };
        if t1 >= 1.0 || t0 >= 1.0 {
            return tail;
        }
        let local = (t1 - t0) / (1.0 - t0);
        tail.split_at(local.clamp(0.0, 1.0)).0
    }

    /// Arc length between `t0` and `t1` by composite Gauss-Legendre quadrature.
    #[must_use]
    pub fn arc_length_between(&self, t0: f64, t1: f64) -> f64 {
        if self.degree() == 1 {
            return self.point_at(t0).distance_to(self.point_at(t1));
        }
        let pieces = 4 * self.degree();
        let step = (t1 - t0) / pieces as f64;
        let mut total = 0.0;
        for piece in 0..pieces {
            let a = t0 + step * piece as f64;
            let half = 0.5 * step;
            let mid = a + half;
            for (node, weight) in GAUSS_LEGENDRE_8 {
                total += weight * half * self.derivative_at(mid + half * node).length();
            }
        }
        total.abs()
    }

    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.arc_length_between(0.0, 1.0)
    }

    /// Every control point coincides with the first one.
    #[must_use]
    pub fn is_degenerate(&self, tol: Tolerance) -> bool {
        self.control
            .iter()
            .all(|p| tol.approx_eq_point3(*p, self.control[0]))
    }
}

impl Curve3 for BezierSpan {
    fn point_at(&self, t: f64) -> Point3 {
        de_casteljau(&self.control, t)
    }

    fn is_closed(&self) -> bool {
        self.degree() > 1 && self.start() == self.end()
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let n = self.degree();
        let hodograph: Vec<Point3> = self
            .control
            .windows(2)
            .map(|w| Point3::ORIGIN.add_vec(w[1].sub_point(w[0]).mul_scalar(n as f64)))
            .collect();
        de_casteljau(&hodograph, t).to_vec3()
    }

    fn second_derivative_at(&self, t: f64) -> Vec3 {
        let n = self.degree();
        if n < 2 {
            return Vec3::ZERO;
        }
        let scale = (n * (n - 1)) as f64;
        let second: Vec<Point3> = self
            .control
            .windows(3)
            .map(|w| Point3::ORIGIN.add_vec(second_difference(w[0], w[1], w[2]).mul_scalar(scale)))
            .collect();
        de_casteljau(&second, t).to_vec3()
    }
}

/// Evaluate the Bezier polygon `control` at `t` by repeated averaging.
#[must_use]
pub fn de_casteljau(control: &[Point3], t: f64) -> Point3 {
    let mut work = control.to_vec();
    let n = work.len();
    for level in 1..n {
        for i in 0..n - level {
            work[i] = work[i].lerp(work[i + 1], t);
        }
    }
    work.first().copied().unwrap_or(Point3::ORIGIN)
}

fn second_difference(p0: Point3, p1: Point3, p2: Point3) -> Vec3 {
    Vec3::new(
        p2.x - 2.0 * p1.x + p0.x,
        p2.y - 2.0 * p1.y + p0.y,
        p2.z - 2.0 * p1.z + p0.z,
    )
}

const GAUSS_LEGENDRE_8: [(f64, f64); 8] = [
    (-0.960_289_856_497_536_3, 0.101_228_536_290_376_26),
    (-0.796_666_477_413_626_7, 0.222_381_034_453_374_47),
    (-0.525_532_409_916_329_0, 0.313_706_645_877_887_3),
    (-0.183_434_642_495_649_8, 0.362_683_783_378_362_0),
    (0.183_434_642_495_649_8, 0.362_683_783_378_362_0),
    (0.525_532_409_916_329_0, 0.313_706_645_877_887_3),
    (0.796_666_477_413_626_7, 0.222_381_034_453_374_47),
    (0.960_289_856_497_536_3, 0.101_228_536_290_376_26),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter_arc() -> BezierSpan {
        BezierSpan::new(vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn split_halves_meet_at_split_point() {
        let span = quarter_arc();
        let (left, right) = span.split_at(0.3);
        let p = span.point_at(0.3);
        assert!(left.end().distance_to(p) < 1e-12);
        assert!(right.start().distance_to(p) < 1e-12);
        assert!(left.point_at(0.5).distance_to(span.point_at(0.15)) < 1e-12);
    }

    #[test]
    fn arc_length_of_line_span_is_chord() {
        let span = BezierSpan::line(Point3::ORIGIN, Point3::new(3.0, 4.0, 0.0));
        assert!((span.arc_length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn arc_length_of_quarter_arc_matches_closed_form() {
        // Quadratic (1,0) (1,1) (0,1): speed 2 sqrt(t^2 + (1-t)^2).
        let span = quarter_arc();
        let expected = 1.0 + 1.0_f64.asinh() / std::f64::consts::SQRT_2;
        assert!((span.arc_length() - expected).abs() < 1e-9);
    }

    #[test]
    fn derivatives_match_closed_form_quadratic() {
        let span = quarter_arc();
        // B'(0) = 2 (P1 - P0), B'' = 2 (P2 - 2 P1 + P0)
        assert_eq!(span.derivative_at(0.0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(span.second_derivative_at(0.5), Vec3::new(-2.0, -2.0, 0.0));
    }

    #[test]
    fn sub_span_covers_requested_interval() {
        let span = quarter_arc();
        let sub = span.sub_span(0.25, 0.75);
        assert!(sub.start().distance_to(span.point_at(0.25)) < 1e-12);
        assert!(sub.end().distance_to(span.point_at(0.75)) < 1e-12);
    }
}
