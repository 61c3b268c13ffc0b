//! Curve division anchored at an interior parameter.
//!
//! Both divisions walk outwards from the anchor in both directions, so the
//! anchor is always one of the division points and the leftover pieces end
//! up at the curve ends.

use serde::Serialize;

use super::backend::CurveBackend;
use super::core::{Point3, Tolerance, Vec3};
use super::curve::Curve3;
use super::error::{BackendError, GeomError, GeomResult, positive};

/// Samples per walk used to bracket the next chord crossing.
const CHORD_SAMPLES: usize = 256;
const BISECTION_STEPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DivisionPoint {
    pub point: Point3,
    /// Unit tangent, zero where the curve is degenerate.
    pub tangent: Vec3,
    pub parameter: f64,
}

impl DivisionPoint {
    fn on<C: Curve3 + ?Sized>(curve: &C, parameter: f64) -> Self {
        Self {
            point: curve.point_at(parameter),
            tangent: curve.tangent_at(parameter).unwrap_or(Vec3::ZERO),
            parameter,
        }
    }
}

fn anchor_parameter<C: Curve3 + ?Sized>(curve: &C, parameter: f64) -> GeomResult<f64> {
    let (a, b) = curve.domain();
    if parameter.is_nan() {
        return Err(GeomError::ParameterOutOfRange {
            name: "parameter",
            value: parameter,
            min: a,
            max: b,
        });
    }
    Ok(parameter.clamp(a, b))
}

/// Points spaced `length` apart along the curve, measured from `parameter`.
///
/// Parameters at or beyond the domain ends anchor the division at that end.
/// Points come back in increasing parameter order.
///
/// # Errors
/// Returns [`GeomError::NonPositive`] unless `length > 0`,
/// [`GeomError::ParameterOutOfRange`] for a NaN parameter and
/// [`GeomError::Backend`] when the backend cannot split or measure the curve.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn divide_length_from<B>(
    backend: &B,
    curve: &B::Curve,
    length: f64,
    parameter: f64,
) -> GeomResult<Vec<DivisionPoint>>
where
    B: CurveBackend + ?Sized,
    B::Curve: Curve3,
{
    let length = positive("length", length)?;
    let t = anchor_parameter(curve, parameter)?;
    let (a, b) = curve.domain();
    let total = backend.length(curve);
    let offset = if t <= a {
        0.0
    } else if t >= b {
        total
    } else {
        backend
            .split(curve, &[t])?
            .first()
            .map_or(0.0, |head| backend.length(head))
    };

    let eps = Tolerance::LOOSE.eps * total.max(1.0);
    let before = ((offset + eps) / length).floor() as usize;
    let after = ((total - offset + eps) / length).floor() as usize;

    let at_length = |distance: f64| -> GeomResult<DivisionPoint> {
        let parameter = backend
            .length_parameter(curve, distance.clamp(0.0, total))
            .ok_or_else(|| BackendError::Other(format!("no curve parameter at length {distance}")))?;
        Ok(DivisionPoint::on(curve, parameter))
    };

    let mut points = Vec::with_capacity(before + after + 1);
    for k in (1..=before).rev() {
        points.push(at_length(offset - length * k as f64)?);
    }
    points.push(DivisionPoint::on(curve, t));
    for k in 1..=after {
        points.push(at_length(offset + length * k as f64)?);
    }

    log::debug!(
        "divide by length {length} from t={t}: {} points over length {total}",
        points.len()
    );
    Ok(points)
}

/// Points whose straight-line distance to their neighbour is `distance`,
/// walking outwards from `parameter`.
///
/// Parameters at or beyond the domain ends anchor the division at that end.
/// Points come back in increasing parameter order.
///
/// # Errors
/// Returns [`GeomError::NonPositive`] unless `distance > 0` and
/// [`GeomError::ParameterOutOfRange`] for a NaN parameter.
pub fn divide_distance_from<C: Curve3 + ?Sized>(
    curve: &C,
    distance: f64,
    parameter: f64,
) -> GeomResult<Vec<DivisionPoint>> {
    let distance = positive("distance", distance)?;
    let t = anchor_parameter(curve, parameter)?;
    let (a, b) = curve.domain();

    let mut parameters = chord_walk(curve, t, a, distance);
    parameters.reverse();
    parameters.push(t);
    parameters.extend(chord_walk(curve, t, b, distance));

    log::debug!(
        "divide by distance {distance} from t={t}: {} points",
        parameters.len()
    );
    Ok(parameters
        .into_iter()
        .map(|p| DivisionPoint::on(curve, p))
        .collect())
}

/// Parameters from `start` towards `stop`, each at chord `distance` from
/// the point before it. `start` itself is not included.
#[allow(clippy::cast_precision_loss)]
fn chord_walk<C: Curve3 + ?Sized>(curve: &C, start: f64, stop: f64, distance: f64) -> Vec<f64> {
    let mut parameters = Vec::new();
    let step = (stop - start) / CHORD_SAMPLES as f64;
    if step == 0.0 {
        return parameters;
    }

    let mut anchor = curve.point_at(start);
    let mut inside = start;
    let mut k = 1;
    while k <= CHORD_SAMPLES {
        let t = if k == CHORD_SAMPLES {
            stop
        } else {
            start + step * k as f64
        };
        if curve.point_at(t).distance_to(anchor) < distance {
            inside = t;
            k += 1;
            continue;
        }

        let (mut lo, mut hi) = (inside, t);
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if curve.point_at(mid).distance_to(anchor) < distance {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        parameters.push(hi);
        anchor = curve.point_at(hi);
        inside = hi;
    }
    parameters
}
