pub mod intersect_3d;
pub mod plane;
pub mod polygon_2d;
pub mod triangle;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Tolerance under which two curve points are welded into one.
pub const WELD_TOLERANCE: f64 = 1e-6;

/// Maximum distance from a curve point to a triangle edge for the point to
/// be recorded as lying on that edge.
pub const EDGE_TOLERANCE: f64 = 1e-9;

/// Tolerance used when comparing two supporting planes for coincidence.
pub const COPLANAR_TOLERANCE: f64 = 1e-9;
