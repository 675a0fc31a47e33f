mod constrained;

pub use constrained::ConstrainedTriangulator;

use crate::error::Result;
use crate::math::plane::PlaneFrame;
use crate::math::Point3;

/// A planar triangulation problem: a simple boundary loop, free vertices and
/// segments that must appear as triangle edges.
///
/// All indices refer to `points`. The points are expected to lie (nearly) in
/// the plane of `frame` and are projected onto it before triangulating.
#[derive(Debug, Clone)]
pub struct PlanarProblem {
    /// Vertex positions in 3D.
    pub points: Vec<Point3>,
    /// Plane the problem is solved in.
    pub frame: PlaneFrame,
    /// Indices of the boundary loop, in order.
    pub boundary: Vec<usize>,
    /// Segments required in the output.
    pub constraints: Vec<[usize; 2]>,
    /// Length below which a triangle's height counts as zero.
    pub tolerance: f64,
}

/// Triangulates a planar region with constraint segments.
pub trait PlanarTriangulator {
    /// Returns triangles over the problem's points, counter-clockwise in the
    /// frame's `(u, v)` coordinates.
    ///
    /// Only non-degenerate triangles inside the boundary loop are returned.
    /// No new vertices may be introduced.
    ///
    /// # Errors
    ///
    /// Returns an error if the problem is malformed or cannot be
    /// triangulated without adding vertices.
    fn triangulate(&self, problem: &PlanarProblem) -> Result<Vec<[usize; 3]>>;
}
