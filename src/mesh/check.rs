use crate::error::Result;

use super::{AttributeArray, Mesh};

/// Edge statistics of a surface mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshQuality {
    /// Cell edges with no neighboring cell.
    pub free_edges: usize,
    /// Cell edges shared by more than two cells.
    pub bad_edges: usize,
}

/// Scans every cell edge for free and non-manifold usage.
///
/// Each cell edge is counted once per cell using it. Per-cell counts are
/// stored as the `BadTriangle` and `FreeEdge` integer cell arrays.
///
/// # Errors
///
/// Returns an error if the cell arrays cannot be created.
pub fn check_mesh(mesh: &mut Mesh) -> Result<MeshQuality> {
    let links = mesh.build_links();
    let mut quality = MeshQuality::default();
    let mut bad = Vec::with_capacity(mesh.num_cells());
    let mut free = Vec::with_capacity(mesh.num_cells());

    for (cell_id, cell) in mesh.polys().iter().enumerate() {
        let n = cell.len();
        let mut bad_count = 0i64;
        let mut free_count = 0i64;
        for i in 0..n {
            match links.edge_neighbors(cell_id, cell[i], cell[(i + 1) % n]).count() {
                0 => {
                    quality.free_edges += 1;
                    free_count += 1;
                }
                1 => {}
                _ => {
                    quality.bad_edges += 1;
                    bad_count += 1;
                }
            }
        }
        bad.push(bad_count);
        free.push(free_count);
    }

    let cell_data = mesh.cell_data_mut();
    cell_data.add_array(AttributeArray::int("BadTriangle", 1, bad)?);
    cell_data.add_array(AttributeArray::int("FreeEdge", 1, free)?);

    tracing::debug!(
        free_edges = quality.free_edges,
        bad_edges = quality.bad_edges,
        "mesh check"
    );
    Ok(quality)
}
