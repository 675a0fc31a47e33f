use crate::error::{GeometryError, Result};
use crate::math::plane::PlaneFrame;
use crate::math::triangle::{distance_to_segment, triangle_center, triangle_normal};
use crate::math::{Point3, Vector3};
use crate::mesh::{EdgeLinks, Mesh};
use crate::spatial::PointWelder;
use crate::tessellation::{PlanarProblem, PlanarTriangulator};

use super::context::SplitMaps;
use super::line_split::SplitCurve;

/// Sub-triangles replacing one cut triangle, in output point ids.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CellSplit {
    pub triangles: Vec<[usize; 3]>,
    /// Corners that coincide with a curve point.
    pub corners_on_curve: [bool; 3],
    /// `(curve line, index into triangles)` for every sub-triangle that has
    /// both ends of a curve line as corners.
    pub line_borders: Vec<(usize, usize)>,
    /// `true` when triangulation failed and the parent was kept.
    pub fallback: bool,
}

/// Points gathered for one triangle, welded locally.
///
/// Local ids 0..3 are the corners. Every local point keeps the output id it
/// maps to.
struct LocalPoints {
    welder: PointWelder,
    global: Vec<usize>,
}

impl LocalPoints {
    fn new(corners: [usize; 3], positions: [Point3; 3], tolerance: f64) -> Self {
        let mut welder = PointWelder::new(tolerance);
        for p in positions {
            welder.push(p);
        }
        Self {
            welder,
            global: corners.to_vec(),
        }
    }

    /// Adds a curve point; returns its local id.
    fn insert(&mut self, p: Point3, global: usize) -> usize {
        let (id, inserted) = self.welder.insert(p);
        if inserted {
            self.global.push(global);
        }
        id
    }
}

/// Re-triangulates cut triangles of one mesh along its split curve.
pub(crate) struct CellSplitter<'a, T> {
    pub mesh: &'a Mesh,
    pub links: &'a EdgeLinks,
    pub curve: &'a SplitCurve,
    pub maps: &'a SplitMaps,
    pub triangulator: &'a T,
    pub tolerance: f64,
}

impl<T: PlanarTriangulator> CellSplitter<'_, T> {
    /// Output id of split-curve point `id`: curve points follow the mesh's
    /// own points.
    fn global_id(&self, id: usize) -> usize {
        self.mesh.num_points() + id
    }

    /// Splits triangle `cell`. Falls back to the unchanged parent when the
    /// local problem cannot be triangulated.
    pub fn split(&self, cell: usize, corners: [usize; 3]) -> CellSplit {
        match self.try_split(cell, corners) {
            Ok(split) => split,
            Err(err) => {
                tracing::warn!(cell, %err, "could not split triangle, keeping it whole");
                CellSplit {
                    triangles: vec![corners],
                    corners_on_curve: [false; 3],
                    line_borders: Vec::new(),
                    fallback: true,
                }
            }
        }
    }

    fn try_split(&self, cell: usize, corners: [usize; 3]) -> Result<CellSplit> {
        let positions = self
            .mesh
            .triangle_points(cell)
            .ok_or_else(|| GeometryError::Degenerate(format!("cell {cell} is not a valid triangle")))?;
        let normal = triangle_normal(&positions[0], &positions[1], &positions[2])
            .ok_or_else(|| GeometryError::Degenerate(format!("cell {cell} has zero area")))?;

        let mut local = LocalPoints::new(corners, positions, self.tolerance);
        let mut corners_on_curve = [false; 3];
        let mut constraints: Vec<[usize; 2]> = Vec::new();
        let mut line_ends: Vec<(usize, [usize; 2])> = Vec::new();

        for &line in self.maps.cell_lines(cell) {
            let Some(&[a, b]) = self.curve.lines.get(line) else {
                tracing::warn!(cell, line, "cell refers to a missing curve line");
                continue;
            };
            let ends = [a, b].map(|id| {
                let la = local.insert(self.curve.points[id], self.global_id(id));
                if la < 3 {
                    corners_on_curve[la] = true;
                }
                la
            });
            if ends[0] == ends[1] {
                continue;
            }
            line_ends.push((line, ends));
            if !constraints.iter().any(|c| *c == ends || *c == [ends[1], ends[0]]) {
                constraints.push(ends);
            }
        }

        // Curve points cut into the shared edges by neighboring triangles.
        for k in 0..3 {
            let (a, b) = (corners[k], corners[(k + 1) % 3]);
            let (pa, pb) = (positions[k], positions[(k + 1) % 3]);
            for neighbor in self.links.edge_neighbors(cell, a, b) {
                for &line in self.maps.cell_lines(neighbor) {
                    let Some(ends) = self.curve.lines.get(line) else {
                        continue;
                    };
                    for &id in ends {
                        let p = self.curve.points[id];
                        if distance_to_segment(&p, &pa, &pb) <= self.tolerance {
                            let l = local.insert(p, self.global_id(id));
                            if l < 3 {
                                corners_on_curve[l] = true;
                            }
                        }
                    }
                }
            }
        }

        let points = local.welder.points().to_vec();
        if points.len() == 3 {
            let line_borders = line_ends.iter().map(|&(line, _)| (line, 0)).collect();
            return Ok(CellSplit {
                triangles: vec![corners],
                corners_on_curve,
                line_borders,
                fallback: false,
            });
        }

        let center = triangle_center(&positions[0], &positions[1], &positions[2]);
        let frame = PlaneFrame::from_normal(center, normal)?;
        let boundary = self.boundary_loop(&points, &positions, &frame);

        let problem = PlanarProblem {
            points,
            frame,
            boundary,
            constraints,
            tolerance: self.tolerance,
        };
        let local_triangles = self.triangulator.triangulate(&problem)?;

        let triangles = local_triangles
            .iter()
            .map(|t| {
                let ids = t.map(|l| local.global[l]);
                orient(ids, t.map(|l| problem.points[l]), &normal)
            })
            .collect();
        let line_borders = line_ends
            .iter()
            .flat_map(|&(line, [a, b])| {
                local_triangles
                    .iter()
                    .enumerate()
                    .filter(move |(_, t)| t.contains(&a) && t.contains(&b))
                    .map(move |(sub, _)| (line, sub))
            })
            .collect();

        Ok(CellSplit {
            triangles,
            corners_on_curve,
            line_borders,
            fallback: false,
        })
    }

    /// Corners plus every point on an edge, counter-clockwise about the
    /// triangle center.
    fn boundary_loop(&self, points: &[Point3], corners: &[Point3; 3], frame: &PlaneFrame) -> Vec<usize> {
        let mut boundary: Vec<(f64, usize)> = points
            .iter()
            .enumerate()
            .filter(|&(i, p)| {
                i < 3 || (0..3).any(|k| distance_to_segment(p, &corners[k], &corners[(k + 1) % 3]) <= self.tolerance)
            })
            .map(|(i, p)| {
                let uv = frame.project(p);
                (uv.y.atan2(uv.x), i)
            })
            .collect();
        boundary.sort_by(|a, b| a.0.total_cmp(&b.0));
        boundary.into_iter().map(|(_, i)| i).collect()
    }
}

/// Reverses `ids` if the triangle faces away from `parent_normal`.
fn orient(ids: [usize; 3], positions: [Point3; 3], parent_normal: &Vector3) -> [usize; 3] {
    match triangle_normal(&positions[0], &positions[1], &positions[2]) {
        Some(n) if n.dot(parent_normal) < 0.0 => [ids[0], ids[2], ids[1]],
        _ => ids,
    }
}
