use std::collections::HashMap;

use super::Mesh;

/// Edge-to-cell adjacency of a mesh.
///
/// Edges are keyed by their unordered point pair, so two cells that use the
/// same edge with opposite winding are still neighbors.
#[derive(Debug, Clone, Default)]
pub struct EdgeLinks {
    edges: HashMap<(usize, usize), Vec<usize>>,
}

/// Unordered key of the edge `(a, b)`.
#[inline]
#[must_use]
pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl EdgeLinks {
    /// Builds the adjacency for every cell of `mesh`.
    #[must_use]
    pub fn build(mesh: &Mesh) -> Self {
        let mut edges: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (cell_id, cell) in mesh.polys().iter().enumerate() {
            let n = cell.len();
            for i in 0..n {
                let key = edge_key(cell[i], cell[(i + 1) % n]);
                let cells = edges.entry(key).or_default();
                if !cells.contains(&cell_id) {
                    cells.push(cell_id);
                }
            }
        }
        Self { edges }
    }

    /// Returns every cell that uses the edge `(a, b)`.
    #[must_use]
    pub fn edge_cells(&self, a: usize, b: usize) -> &[usize] {
        self.edges.get(&edge_key(a, b)).map_or(&[], Vec::as_slice)
    }

    /// Returns the cells other than `cell` that use the edge `(a, b)`.
    pub fn edge_neighbors(&self, cell: usize, a: usize, b: usize) -> impl Iterator<Item = usize> + '_ {
        self.edge_cells(a, b).iter().copied().filter(move |&c| c != cell)
    }
}
