use slotmap::SlotMap;

use crate::math::Point3;
use crate::mesh::Mesh;

use super::{Aabb, OverlapIndex};

slotmap::new_key_type! {
    /// Unique identifier for a node of an [`AabbTree`].
    pub struct NodeId;
}

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf(Vec<usize>),
    Internal([NodeId; 2]),
}

#[derive(Debug, Clone)]
struct TreeNode {
    bounds: Aabb,
    kind: NodeKind,
}

/// One indexed cell: id, bounds and centroid of its bounds.
type Item = (usize, Aabb, Point3);

/// Bounding-volume hierarchy of axis-aligned boxes over the cells of a mesh.
///
/// Built top-down by median splits along the longest axis of the cell
/// centers, stopping once a node holds at most `cells_per_leaf` cells.
#[derive(Debug, Default)]
pub struct AabbTree {
    nodes: SlotMap<NodeId, TreeNode>,
    root: Option<NodeId>,
    margin: f64,
}

impl AabbTree {
    /// Builds the tree over every cell of `mesh`.
    ///
    /// Cells that reference missing points are left out. Boxes are inflated
    /// by `margin` when tested against each other.
    #[must_use]
    pub fn build(mesh: &Mesh, cells_per_leaf: usize, margin: f64) -> Self {
        let mut items: Vec<Item> = Vec::with_capacity(mesh.num_cells());
        for (cell_id, cell) in mesh.polys().iter().enumerate() {
            let points: Option<Vec<&Point3>> = cell.iter().map(|&i| mesh.point(i)).collect();
            let Some(points) = points.filter(|p| !p.is_empty()) else {
                tracing::warn!(cell = cell_id, "cell references a missing point, not indexed");
                continue;
            };
            let bounds = Aabb::from_points(points);
            items.push((cell_id, bounds, bounds.center()));
        }

        let mut tree = Self {
            nodes: SlotMap::with_key(),
            root: None,
            margin,
        };
        if !items.is_empty() {
            let root = tree.build_node(&mut items, cells_per_leaf.max(1));
            tree.root = Some(root);
        }
        tracing::trace!(nodes = tree.nodes.len(), "built aabb tree");
        tree
    }

    fn build_node(&mut self, items: &mut [Item], cells_per_leaf: usize) -> NodeId {
        let bounds = items
            .iter()
            .fold(Aabb::empty(), |acc, (_, b, _)| acc.merged(b));
        let centers = Aabb::from_points(items.iter().map(|(_, _, c)| c));
        let extents = centers.extents();
        let axis = extents.imax();

        if items.len() <= cells_per_leaf || extents[axis] <= 0.0 {
            let cells = items.iter().map(|(id, _, _)| *id).collect();
            return self.nodes.insert(TreeNode {
                bounds,
                kind: NodeKind::Leaf(cells),
            });
        }

        let mid = items.len() / 2;
        items.select_nth_unstable_by(mid, |a, b| a.2[axis].total_cmp(&b.2[axis]));
        let (left, right) = items.split_at_mut(mid);
        let left = self.build_node(left, cells_per_leaf);
        let right = self.build_node(right, cells_per_leaf);
        self.nodes.insert(TreeNode {
            bounds,
            kind: NodeKind::Internal([left, right]),
        })
    }

    /// Returns the root node, or `None` for an empty tree.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the number of leaves.
    #[must_use]
    pub fn num_leaves(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| matches!(n.kind, NodeKind::Leaf(_)))
            .count()
    }
}

impl OverlapIndex for AabbTree {
    type Node = NodeId;

    fn for_each_overlapping_leaf_pair<F>(&self, other: &Self, mut visit: F)
    where
        F: FnMut(NodeId, NodeId),
    {
        let (Some(root_a), Some(root_b)) = (self.root, other.root) else {
            return;
        };
        let margin = self.margin.max(other.margin);
        let mut stack = vec![(root_a, root_b)];

        while let Some((id_a, id_b)) = stack.pop() {
            let (Some(a), Some(b)) = (self.nodes.get(id_a), other.nodes.get(id_b)) else {
                continue;
            };
            if !a.bounds.loosened(margin).intersects(&b.bounds) {
                continue;
            }
            match (&a.kind, &b.kind) {
                (NodeKind::Leaf(_), NodeKind::Leaf(_)) => visit(id_a, id_b),
                (NodeKind::Internal(children), NodeKind::Leaf(_)) => {
                    stack.extend(children.iter().map(|&c| (c, id_b)));
                }
                (NodeKind::Leaf(_), NodeKind::Internal(children)) => {
                    stack.extend(children.iter().map(|&c| (id_a, c)));
                }
                (NodeKind::Internal(ca), NodeKind::Internal(cb)) => {
                    // Descend into the larger box first.
                    if a.bounds.extents().norm_squared() >= b.bounds.extents().norm_squared() {
                        stack.extend(ca.iter().map(|&c| (c, id_b)));
                    } else {
                        stack.extend(cb.iter().map(|&c| (id_a, c)));
                    }
                }
            }
        }
    }

    fn leaf_cells(&self, node: NodeId) -> &[usize] {
        match self.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::Leaf(cells)) => cells,
            _ => &[],
        }
    }

    fn triangle_may_intersect_node(&self, node: NodeId, triangle: &[Point3; 3]) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| n.bounds.may_intersect_triangle(triangle, self.margin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// A flat grid of `n * n` quads split into triangles, offset by `origin`.
    fn grid(n: usize, origin: Point3) -> Mesh {
        let mut points = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                #[allow(clippy::cast_precision_loss)]
                points.push(origin + crate::math::Vector3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut tris = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let a = j * (n + 1) + i;
                let b = a + 1;
                let c = a + n + 1;
                let d = c + 1;
                tris.push([a, b, d]);
                tris.push([a, d, c]);
            }
        }
        Mesh::from_triangles(points, &tris).unwrap()
    }

    #[test]
    fn every_cell_lands_in_one_leaf() {
        let mesh = grid(8, Point3::origin());
        let tree = AabbTree::build(&mesh, 10, 1e-6);
        assert!(tree.num_leaves() > 1);

        let mut seen = HashSet::new();
        tree.for_each_overlapping_leaf_pair(&tree, |a, _| {
            for &c in tree.leaf_cells(a) {
                seen.insert(c);
            }
        });
        assert_eq!(seen.len(), mesh.num_cells());
    }

    #[test]
    fn disjoint_meshes_have_no_leaf_pairs() {
        let a = AabbTree::build(&grid(4, Point3::origin()), 4, 1e-6);
        let b = AabbTree::build(&grid(4, Point3::new(0.0, 0.0, 10.0)), 4, 1e-6);
        let mut pairs = 0;
        a.for_each_overlapping_leaf_pair(&b, |_, _| pairs += 1);
        assert_eq!(pairs, 0);
    }

    #[test]
    fn overlapping_cells_are_reported_together() {
        let a = grid(6, Point3::origin());
        let b = grid(6, Point3::new(2.5, 2.5, 0.0));
        let tree_a = AabbTree::build(&a, 3, 1e-6);
        let tree_b = AabbTree::build(&b, 3, 1e-6);

        let mut pairs = HashSet::new();
        tree_a.for_each_overlapping_leaf_pair(&tree_b, |na, nb| {
            for &ca in tree_a.leaf_cells(na) {
                for &cb in tree_b.leaf_cells(nb) {
                    pairs.insert((ca, cb));
                }
            }
        });

        // Brute force: every pair of overlapping cell boxes must be present.
        for ca in 0..a.num_cells() {
            let ba = Aabb::from_points(&a.triangle_points(ca).unwrap());
            for cb in 0..b.num_cells() {
                let bb = Aabb::from_points(&b.triangle_points(cb).unwrap());
                if ba.intersects(&bb) {
                    assert!(pairs.contains(&(ca, cb)), "missing pair ({ca}, {cb})");
                }
            }
        }
    }

    #[test]
    fn empty_mesh_builds_empty_tree() {
        let tree = AabbTree::build(&Mesh::default(), 10, 0.0);
        assert!(tree.root().is_none());
        let mut called = false;
        tree.for_each_overlapping_leaf_pair(&tree, |_, _| called = true);
        assert!(!called);
    }
}
