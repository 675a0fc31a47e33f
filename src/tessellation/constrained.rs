use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::math::polygon_2d::{orient_2d, signed_area_2d};
use crate::math::Point2;
use crate::mesh::links::edge_key;

use super::{PlanarProblem, PlanarTriangulator};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Constrained Delaunay triangulator backed by `spade`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedTriangulator;

impl ConstrainedTriangulator {
    /// Creates a new triangulator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PlanarTriangulator for ConstrainedTriangulator {
    fn triangulate(&self, problem: &PlanarProblem) -> Result<Vec<[usize; 3]>> {
        let n = problem.points.len();
        if problem.boundary.len() < 3 {
            return Err(TessellationError::InvalidParameters(
                "boundary loop needs at least 3 points".into(),
            )
            .into());
        }
        if let Some(&bad) = problem
            .boundary
            .iter()
            .chain(problem.constraints.iter().flatten())
            .find(|&&i| i >= n)
        {
            return Err(TessellationError::InvalidParameters(format!(
                "index {bad} out of range ({n} points)"
            ))
            .into());
        }

        let uv: Vec<Point2> = problem.points.iter().map(|p| problem.frame.project(p)).collect();
        let outline: Vec<Point2> = problem.boundary.iter().map(|&i| uv[i]).collect();
        if signed_area_2d(&outline).abs() <= problem.tolerance * problem.tolerance {
            return Err(TessellationError::InvalidParameters("boundary loop has no area".into()).into());
        }

        let mut cdt = Cdt::new();
        let mut handles = Vec::with_capacity(n);
        // Points landing on an existing vertex keep the first local index.
        let mut local_of: HashMap<usize, usize> = HashMap::new();
        for (i, p) in uv.iter().enumerate() {
            let h = cdt
                .insert(SpadePoint2::new(p.x, p.y))
                .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
            local_of.entry(h.index()).or_insert(i);
            handles.push(h);
        }

        let m = problem.boundary.len();
        let boundary_edges: Vec<[usize; 2]> = (0..m)
            .map(|i| [problem.boundary[i], problem.boundary[(i + 1) % m]])
            .collect();
        let mut outline_keys = HashSet::new();
        for &[a, b] in boundary_edges.iter().chain(problem.constraints.iter()) {
            let (from, to) = (handles[a], handles[b]);
            if from == to {
                continue;
            }
            if !cdt.can_add_constraint(from, to) {
                return Err(TessellationError::Failed(format!(
                    "constraint ({a}, {b}) crosses another constraint"
                ))
                .into());
            }
            cdt.add_constraint(from, to);
        }
        for &[a, b] in &boundary_edges {
            outline_keys.insert(edge_key(handles[a].index(), handles[b].index()));
        }

        let interior = classify_interior_faces(&cdt, &outline_keys);
        let mut triangles = Vec::new();
        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }
            let verts = face.vertices();
            let corners = verts.map(|v| {
                let p = v.position();
                Point2::new(p.x, p.y)
            });
            if is_sliver(&corners, problem.tolerance) {
                continue;
            }
            let mut tri = [0usize; 3];
            for (slot, v) in tri.iter_mut().zip(verts.iter()) {
                *slot = *local_of.get(&v.fix().index()).ok_or_else(|| {
                    TessellationError::Failed("triangulation introduced a new vertex".into())
                })?;
            }
            triangles.push(tri);
        }

        if triangles.is_empty() {
            return Err(TessellationError::Failed("no triangles inside the boundary".into()).into());
        }
        Ok(triangles)
    }
}

/// `true` when the triangle's height over its longest edge is within `tolerance`.
fn is_sliver(corners: &[Point2; 3], tolerance: f64) -> bool {
    let longest = (0..3)
        .map(|k| (corners[(k + 1) % 3] - corners[k]).norm())
        .fold(0.0, f64::max);
    orient_2d(&corners[0], &corners[1], &corners[2]).abs() <= tolerance * longest
}

/// Flood-fills the inner faces from the outer face, flipping parity each time
/// an edge of the boundary loop is crossed. Odd parity is interior.
///
/// Interior constraint segments do not flip parity, so a curve cutting the
/// region never turns half of it inside out.
fn classify_interior_faces(cdt: &Cdt, outline: &HashSet<(usize, usize)>) -> HashSet<usize> {
    let crosses_outline = |from: usize, to: usize| outline.contains(&edge_key(from, to));

    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        let Some(inner) = edge.rev().face().as_inner() else {
            continue;
        };
        let idx = inner.fix().index();
        if depth_map.contains_key(&idx) {
            continue;
        }
        let depth = u32::from(crosses_outline(edge.from().fix().index(), edge.to().fix().index()));
        depth_map.insert(idx, depth);
        if depth % 2 == 1 {
            interior.insert(idx);
        }
        queue.push_back((inner.fix(), depth));
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = depth + u32::from(crosses_outline(edge.from().fix().index(), edge.to().fix().index()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((neighbor.fix(), depth));
        }
    }

    interior
}
