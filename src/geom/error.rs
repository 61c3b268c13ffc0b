//! Error kinds shared by the refinement, editing and blending operations.
//!
//! Every variant is fatal for the current call. Soft conditions (a distance
//! inset longer than half a segment, an index listed twice, a zero offset)
//! never reach this type; they fall back to a documented default instead.

/// Failure reported by an external curve or tessellation backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("blend curve could not be built: {reason}")]
    Blend { reason: String },

    #[error("split parameter {parameter} outside curve domain")]
    SplitParameter { parameter: f64 },

    #[error("tessellation failed: {reason}")]
    Tessellation { reason: String },

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeomError {
    /// Malformed or too small input.
    #[error("polyline must have at least {required} points, got {count}")]
    InsufficientPoints { required: usize, count: usize },

    #[error("polyline must have at least {required} segments, got {count}")]
    InsufficientSegments { required: usize, count: usize },

    #[error("iteration count must be non-negative, got {iterations}")]
    NegativeIterations { iterations: i32 },

    #[error("{name} must be finite and within [{min}, {max}], got {value}")]
    ParameterOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    /// Out-of-range vertex or segment index.
    #[error("{kind} index {index} out of range for {count} {kind}s")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    /// The produced pieces did not join into a single curve.
    #[error("{pieces} curve pieces joined into {joined} curves, expected exactly 1")]
    Join { pieces: usize, joined: usize },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl GeomError {
    /// Coarse classification used by host layers to pick a message level.
    #[must_use]
    pub const fn kind(&self) -> GeomErrorKind {
        match self {
            Self::InsufficientPoints { .. }
            | Self::InsufficientSegments { .. }
            | Self::NegativeIterations { .. }
            | Self::ParameterOutOfRange { .. }
            | Self::NonPositive { .. } => GeomErrorKind::Input,
            Self::IndexOutOfRange { .. } => GeomErrorKind::Index,
            Self::Join { .. } => GeomErrorKind::Join,
            Self::Backend(_) => GeomErrorKind::Backend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomErrorKind {
    Input,
    Index,
    Join,
    Backend,
}

pub type GeomResult<T> = Result<T, GeomError>;

/// Validate an iteration count coming from a host integer.
pub(crate) fn iteration_count(iterations: i32) -> GeomResult<usize> {
    usize::try_from(iterations).map_err(|_| GeomError::NegativeIterations { iterations })
}

/// Validate a unit-interval parameter.
pub(crate) fn unit_parameter(name: &'static str, value: f64) -> GeomResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(GeomError::ParameterOutOfRange {
            name,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

/// Validate a strictly positive length or radius.
pub(crate) fn positive(name: &'static str, value: f64) -> GeomResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeomError::NonPositive { name, value })
    }
}
