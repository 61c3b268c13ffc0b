mod backend;
mod batch;
mod bezier;
mod blend;
mod bounds;
mod core;
mod curve;
mod divide;
mod error;
mod grid;
mod polygon;
mod polyline;
mod relax;
mod smooth;
mod tessellate;
mod topology;

pub use backend::{BlendEnd, Continuity, CurveBackend, TessellationSolver};
pub use batch::{BatchSafe, blend_corners_batch, smooth_polylines, triangulate_polylines};
pub use bezier::{BezierBackend, JoinCurvesDiagnostics, PolyCurve};
pub use blend::{
    CloseCurveOptions, CornerBlendDiagnostics, CornerBlendOptions, CornerInset, blend_corners,
    close_curve, smooth_corners, smooth_corners_by_distance,
};
pub use bounds::{BoundingMode, bounding_rectangle, bounding_rectangles};
pub use core::{BBox, Plane, Point3, Tolerance, Vec3, centroid, tween};
pub use curve::{BezierSpan, Curve3, Line3, de_casteljau};
pub use divide::{DivisionPoint, divide_distance_from, divide_length_from};
pub use error::{BackendError, GeomError, GeomErrorKind, GeomResult};
pub use grid::{RadialGridKind, RadialGridOptions, radial_grid};
pub use polygon::{MIN_POLYGON_SIDES, circumscribed_polygon, edge_polygon, inscribed_polygon};
pub use polyline::{ControlPolygon, Polyline};
pub use relax::{LloydDiagnostics, lloyd_relaxation};
pub use smooth::{
    SmoothPolylineDiagnostics, SmoothPolylineOptions, SmoothingScheme, degree2_smoothing,
    degree3_smoothing, degree_n_smoothing, smooth_polyline, snub,
};
pub use tessellate::DefaultTessellator;
pub use topology::{
    midedge, offset_by_parameter, quadrangular_fan, remove_points_by_index,
    remove_segments_by_index, triangular_fan, triangulate,
};

#[cfg(test)]
mod tests;
