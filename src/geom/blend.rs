//! Corner rounding and curve closing on top of a [`CurveBackend`].
//!
//! A piecewise curve is taken apart into its smooth segments. Each corner
//! between consecutive segments is cut back on both sides and bridged with a
//! blend curve of the requested continuity; the untouched middles of the
//! segments are kept and everything is joined back into one curve.

use serde::{Deserialize, Serialize};

use super::backend::{BlendEnd, Continuity, CurveBackend};
use super::error::{BackendError, GeomError, GeomResult, unit_parameter};

/// How far each corner is cut back along its two segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CornerInset {
    /// Fraction of each segment's parameter range; half of it is taken from
    /// either end, so `1.0` consumes every segment completely.
    Parameter(f64),
    /// Arc length measured from the corner. Segments shorter than twice the
    /// distance fall back to their midpoint.
    Distance(f64),
}

/// Options for [`smooth_corners`] and [`smooth_corners_by_distance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerBlendOptions {
    pub continuity: Continuity,
    /// Also blend the corner between the last and first segment of an open
    /// curve, closing it.
    pub close: bool,
}

impl CornerBlendOptions {
    #[must_use]
    pub const fn new(continuity: Continuity) -> Self {
        Self {
            continuity,
            close: false,
        }
    }

    #[must_use]
    pub const fn with_continuity(mut self, continuity: Continuity) -> Self {
        self.continuity = continuity;
        self
    }

    #[must_use]
    pub const fn with_close(mut self, close: bool) -> Self {
        self.close = close;
        self
    }
}

impl Default for CornerBlendOptions {
    fn default() -> Self {
        Self::new(Continuity::Tangency)
    }
}

/// Diagnostics for corner blending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CornerBlendDiagnostics {
    pub segment_count: usize,
    pub blended_corner_count: usize,
    /// Segment middles kept between two insets.
    pub kept_segment_count: usize,
    /// Insets that fell back to the segment midpoint.
    pub midpoint_fallback_count: usize,
    pub closed: bool,
    pub warnings: Vec<String>,
}

/// Round every corner, cutting back `t / 2` of each adjoining segment's
/// parameter range.
///
/// `t == 0` returns a copy of the input.
///
/// # Errors
/// Returns [`GeomError::ParameterOutOfRange`] unless `0 <= t <= 1`,
/// [`GeomError::Backend`] when a blend cannot be built, and
/// [`GeomError::Join`] when the pieces do not join into one curve.
pub fn smooth_corners<B: CurveBackend + ?Sized>(
    backend: &B,
    curve: &B::Curve,
    t: f64,
    options: CornerBlendOptions,
) -> GeomResult<(B::Curve, CornerBlendDiagnostics)> {
    blend_corners(backend, curve, CornerInset::Parameter(t), options)
}

/// Round every corner, cutting back `distance` of arc length along each
/// adjoining segment.
///
/// `distance == 0` returns a copy of the input.
///
/// # Errors
/// Returns [`GeomError::NonPositive`] for a negative or non-finite distance,
/// [`GeomError::Backend`] when a blend cannot be built, and
/// [`GeomError::Join`] when the pieces do not join into one curve.
pub fn smooth_corners_by_distance<B: CurveBackend + ?Sized>(
    backend: &B,
    curve: &B::Curve,
    distance: f64,
    options: CornerBlendOptions,
) -> GeomResult<(B::Curve, CornerBlendDiagnostics)> {
    blend_corners(backend, curve, CornerInset::Distance(distance), options)
}

/// Shared driver for both inset modes; validates the inset.
///
/// # Errors
/// See [`smooth_corners`] and [`smooth_corners_by_distance`].
pub fn blend_corners<B: CurveBackend + ?Sized>(
    backend: &B,
    curve: &B::Curve,
    inset: CornerInset,
    options: CornerBlendOptions,
) -> GeomResult<(B::Curve, CornerBlendDiagnostics)> {
    let mut diagnostics = CornerBlendDiagnostics::default();
    let identity = match inset {
        CornerInset::Parameter(t) => unit_parameter("t", t)? == 0.0,
        CornerInset::Distance(d) => {
            if !d.is_finite() || d < 0.0 {
                return Err(GeomError::NonPositive {
                    name: "distance",
                    value: d,
                });
            }
            d == 0.0
        }
    };
    if identity {
        diagnostics.closed = backend.is_closed(curve);
        return Ok((curve.clone(), diagnostics));
    }

    let segments: Vec<B::Curve> = backend
        .segments(curve)
        .iter()
        .map(|seg| backend.reparameterize_unit(seg))
        .collect();
    let count = segments.len();
    diagnostics.segment_count = count;
    if count == 0 {
        return Err(GeomError::InsufficientSegments {
            required: 1,
            count: 0,
        });
    }

    let wrap = backend.is_closed(curve) || options.close;
    let corner_count = if wrap { count } else { count - 1 };

    // Forward parameters where each segment's kept middle starts and ends.
    let mut starts = vec![0.0_f64; count];
    let mut ends = vec![1.0_f64; count];
    let mut blends = Vec::with_capacity(corner_count);

    for i in 0..corner_count {
        let j = (i + 1) % count;
        let a = backend.reparameterize_unit(&backend.reverse(&segments[i]));
        let b = &segments[j];

        let (ta, tb) = match inset {
            CornerInset::Parameter(t) => (t / 2.0, t / 2.0),
            CornerInset::Distance(d) => (
                distance_parameter(backend, &a, d, i, &mut diagnostics),
                distance_parameter(backend, b, d, j, &mut diagnostics),
            ),
        };

        let blend = backend.create_blend_curve(
            BlendEnd::new(&a, ta, true, options.continuity),
            BlendEnd::new(b, tb, true, options.continuity),
        )?;
        ends[i] = 1.0 - ta;
        starts[j] = tb;
        blends.push(blend);
    }
    diagnostics.blended_corner_count = blends.len();

    let mut pieces = Vec::with_capacity(count + blends.len());
    let mut blends = blends.into_iter();
    for (k, segment) in segments.iter().enumerate() {
        if starts[k] < ends[k] {
            pieces.push(trim(backend, segment, starts[k], ends[k])?);
            diagnostics.kept_segment_count += 1;
        }
        if k < corner_count {
            pieces.extend(blends.next());
        }
    }

    let [result] = <[B::Curve; 1]>::try_from(backend.join_curves(&pieces)).map_err(|joined| {
        GeomError::Join {
            pieces: pieces.len(),
            joined: joined.len(),
        }
    })?;

    diagnostics.closed = backend.is_closed(&result);
    log::debug!(
        "blended {} corners over {} segments ({} middles kept, {} midpoint fallbacks)",
        diagnostics.blended_corner_count,
        count,
        diagnostics.kept_segment_count,
        diagnostics.midpoint_fallback_count
    );
    Ok((result, diagnostics))
}

/// Parameter `distance` along `curve` from its start, or the midpoint when
/// the segment is not more than twice as long.
fn distance_parameter<B: CurveBackend + ?Sized>(
    backend: &B,
    curve: &B::Curve,
    distance: f64,
    segment: usize,
    diagnostics: &mut CornerBlendDiagnostics,
) -> f64 {
    let length = backend.length(curve);
    if 2.0 * distance < length {
        if let Some(t) = backend.length_parameter(curve, distance) {
            return t;
        }
    }
    let warning = format!(
        "segment {segment} (length {length}) too short for inset {distance}, using its midpoint"
    );
    log::warn!("{warning}");
    diagnostics.warnings.push(warning);
    diagnostics.midpoint_fallback_count += 1;
    0.5
}

/// Portion of a unit-domain curve between `start < end`.
fn trim<B: CurveBackend + ?Sized>(
    backend: &B,
    curve: &B::Curve,
    start: f64,
    end: f64,
) -> GeomResult<B::Curve> {
    if start <= 0.0 && end >= 1.0 {
        return Ok(curve.clone());
    }
    let mut cuts = Vec::with_capacity(2);
    if start > 0.0 {
        cuts.push(start);
    }
    if end < 1.0 {
        cuts.push(end);
    }
    let pieces = backend.split(curve, &cuts)?;
    let index = usize::from(start > 0.0);
    pieces.into_iter().nth(index).ok_or_else(|| {
        GeomError::Backend(BackendError::Other(format!(
            "split at {cuts:?} returned too few pieces"
        )))
    })
}

// ============================================================================
// Close curve
// ============================================================================

/// Options for [`close_curve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloseCurveOptions {
    /// Tangent arm of the closing blend relative to the gap; `0` leaves the
    /// curve open.
    pub factor: f64,
    pub continuity: Continuity,
}

impl CloseCurveOptions {
    #[must_use]
    pub const fn new(factor: f64, continuity: Continuity) -> Self {
        Self { factor, continuity }
    }

    #[must_use]
    pub const fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    #[must_use]
    pub const fn with_continuity(mut self, continuity: Continuity) -> Self {
        self.continuity = continuity;
        self
    }
}

impl Default for CloseCurveOptions {
    fn default() -> Self {
        Self::new(0.5, Continuity::Position)
    }
}

/// Close an open curve with a blend from its end back to its start.
///
/// A closed input comes back reparameterized to `[0, 1]`; a zero factor
/// returns the input untouched.
///
/// # Errors
/// Returns [`GeomError::ParameterOutOfRange`] for a negative or non-finite
/// factor, [`GeomError::Backend`] when the blend fails and
/// [`GeomError::Join`] when it does not join onto the curve.
pub fn close_curve<B: CurveBackend + ?Sized>(
    backend: &B,
    curve: &B::Curve,
    options: CloseCurveOptions,
) -> GeomResult<B::Curve> {
    let factor = options.factor;
    if !factor.is_finite() || factor < 0.0 {
        return Err(GeomError::ParameterOutOfRange {
            name: "factor",
            value: factor,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    if backend.is_closed(curve) {
        return Ok(backend.reparameterize_unit(curve));
    }
    if factor == 0.0 {
        return Ok(curve.clone());
    }

    let unit = backend.reparameterize_unit(curve);
    let blend = backend.create_blend_curve(
        BlendEnd::new(&unit, 1.0, false, options.continuity).with_bulge(factor),
        BlendEnd::new(&unit, 0.0, true, options.continuity).with_bulge(factor),
    )?;
    let pieces = [unit, blend];
    let joined = backend.join_curves(&pieces);
    match <[B::Curve; 1]>::try_from(joined) {
        Ok([closed]) => {
            log::debug!("closed curve with {:?} blend", options.continuity);
            Ok(closed)
        }
        Err(joined) => Err(GeomError::Join {
            pieces: pieces.len(),
            joined: joined.len(),
        }),
    }
}
