mod aabb;
mod tree;
mod weld;

pub use aabb::Aabb;
pub use tree::{AabbTree, NodeId};
pub use weld::PointWelder;

use crate::math::Point3;

/// A spatial index over the cells of a mesh that can enumerate pairs of
/// leaf regions possibly overlapping between two indexed meshes.
pub trait OverlapIndex {
    /// Handle to a node of the index.
    type Node: Copy;

    /// Calls `visit` for every pair of leaves (one from `self`, one from
    /// `other`) whose bounding volumes may overlap.
    ///
    /// False positives are allowed; a pair of leaves holding intersecting
    /// cells must never be skipped.
    fn for_each_overlapping_leaf_pair<F>(&self, other: &Self, visit: F)
    where
        F: FnMut(Self::Node, Self::Node);

    /// Returns the mesh cell ids stored in a leaf. Internal nodes hold none.
    fn leaf_cells(&self, node: Self::Node) -> &[usize];

    /// Conservative test of a triangle against a node's bounding volume.
    fn triangle_may_intersect_node(&self, node: Self::Node, triangle: &[Point3; 3]) -> bool;
}
