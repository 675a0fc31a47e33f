use crate::math::intersect_3d::{intersect_triangles_with, TriangleIntersection};
use crate::mesh::Mesh;
use crate::spatial::OverlapIndex;

use super::context::IntersectionContext;
use super::curve::{add_segment, SegmentHit};
use super::params::IntersectionParams;

/// Counters gathered while enumerating candidate pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CandidateStats {
    pub leaf_pairs: usize,
    pub triangle_pairs: usize,
    pub coplanar_pairs: usize,
    pub segments: usize,
}

/// Logs one warning per mesh holding cells that are not triangles.
fn warn_non_triangles(mesh: &Mesh, index: usize) {
    let skipped = (0..mesh.num_cells()).filter(|&c| mesh.triangle(c).is_none()).count();
    if skipped > 0 {
        tracing::warn!(mesh = index, skipped, "only triangles are intersected, other cells are skipped");
    }
}

/// Runs the triangle intersector over every candidate pair reported by the
/// two spatial indices and welds the resulting segments into the curve.
pub(crate) fn find_intersections<I: OverlapIndex>(
    ctx: &mut IntersectionContext,
    meshes: [&Mesh; 2],
    indices: [&I; 2],
    params: &IntersectionParams,
) -> CandidateStats {
    let [first, second] = meshes;
    warn_non_triangles(first, 0);
    warn_non_triangles(second, 1);

    let mut stats = CandidateStats::default();
    indices[0].for_each_overlapping_leaf_pair(indices[1], |node0, node1| {
        stats.leaf_pairs += 1;
        for &cell0 in indices[0].leaf_cells(node0) {
            let Some(tri0) = first.triangle_points(cell0) else {
                continue;
            };
            if !indices[1].triangle_may_intersect_node(node1, &tri0) {
                continue;
            }
            for &cell1 in indices[1].leaf_cells(node1) {
                let Some(tri1) = second.triangle_points(cell1) else {
                    continue;
                };
                stats.triangle_pairs += 1;
                match intersect_triangles_with(&tri0, &tri1, params.weld_tolerance, params.coplanar_tolerance) {
                    TriangleIntersection::None => {}
                    TriangleIntersection::Coplanar => stats.coplanar_pairs += 1,
                    TriangleIntersection::Segment { start, end, origins } => {
                        let hit = SegmentHit {
                            cells: [cell0, cell1],
                            triangles: [tri0, tri1],
                            start,
                            end,
                            origins,
                        };
                        if add_segment(ctx, &hit, params.edge_tolerance).is_some() {
                            stats.segments += 1;
                        }
                    }
                }
            }
        }
    });

    tracing::debug!(
        leaf_pairs = stats.leaf_pairs,
        triangle_pairs = stats.triangle_pairs,
        coplanar_pairs = stats.coplanar_pairs,
        segments = stats.segments,
        points = ctx.curve.num_points(),
        lines = ctx.curve.num_lines(),
        "intersection curve built"
    );
    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::spatial::AabbTree;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn run(a: &Mesh, b: &Mesh) -> (IntersectionContext, CandidateStats) {
        let params = IntersectionParams::default();
        let ta = AabbTree::build(a, params.cells_per_leaf, params.weld_tolerance);
        let tb = AabbTree::build(b, params.cells_per_leaf, params.weld_tolerance);
        let mut ctx = IntersectionContext::new(params.weld_tolerance);
        let stats = find_intersections(&mut ctx, [a, b], [&ta, &tb], &params);
        (ctx, stats)
    }

    #[test]
    fn crossing_triangles_produce_one_line() {
        let a = Mesh::from_triangles(vec![p(-1.0, -1.0, 0.0), p(2.0, -1.0, 0.0), p(-1.0, 2.0, 0.0)], &[[0, 1, 2]]).unwrap();
        let b = Mesh::from_triangles(vec![p(-0.5, 0.0, -1.0), p(0.5, 0.0, -1.0), p(0.0, 0.0, 1.0)], &[[0, 1, 2]]).unwrap();
        let (ctx, stats) = run(&a, &b);
        assert_eq!(stats.segments, 1);
        assert_eq!(ctx.curve.num_lines(), 1);
        assert_eq!(ctx.curve.line_cells(), &[[0, 0]]);
    }

    #[test]
    fn coplanar_pairs_are_counted_and_skipped() {
        let a = Mesh::from_triangles(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)], &[[0, 1, 2]]).unwrap();
        let (ctx, stats) = run(&a, &a.clone());
        assert_eq!(stats.coplanar_pairs, 1);
        assert!(ctx.curve.is_empty());
    }

    #[test]
    fn non_triangles_are_skipped() {
        let a = Mesh::new(
            vec![p(-1.0, -1.0, 0.0), p(1.0, -1.0, 0.0), p(1.0, 1.0, 0.0), p(-1.0, 1.0, 0.0)],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap();
        let b = Mesh::from_triangles(vec![p(-0.5, 0.0, -1.0), p(0.5, 0.0, -1.0), p(0.0, 0.0, 1.0)], &[[0, 1, 2]]).unwrap();
        let (ctx, stats) = run(&a, &b);
        assert_eq!(stats.triangle_pairs, 0);
        assert!(ctx.curve.is_empty());
    }
}
