#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Polyline and curve editing: refinement, topology edits, fans and
//! triangulation, corner blending and curve closing.
//!
//! Everything lives in [`geom`]; the most used entry points are re-exported
//! here.

pub mod geom;

pub use geom::{
    BezierBackend, CloseCurveOptions, CornerBlendOptions, CornerInset, CurveBackend,
    DefaultTessellator, GeomError, GeomErrorKind, GeomResult, Point3, PolyCurve, Polyline,
    SmoothPolylineOptions, SmoothingScheme, Tolerance,
};
