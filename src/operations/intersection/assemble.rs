use crate::error::Result;
use crate::math::triangle::barycentric_weights;
use crate::mesh::{AttributeArray, Mesh};
use crate::tessellation::PlanarTriangulator;

use super::cell_split::CellSplitter;
use super::context::SplitMaps;
use super::line_split::SplitCurve;
use super::params::IntersectionParams;

/// A mesh re-triangulated along the curve.
#[derive(Debug, Clone)]
pub(crate) struct AssembledMesh {
    pub mesh: Mesh,
    /// Output cells bordering each curve line, at most two per line.
    pub line_cells: Vec<[Option<usize>; 2]>,
    pub split_cells: usize,
    pub fallbacks: usize,
}

/// Builds the split output of one mesh.
///
/// Points: the input points unchanged, then every split-curve point with its
/// attributes interpolated inside its owning triangle. Cells: triangles that
/// neither are cut nor border a cut triangle are copied; the others are
/// replaced by their sub-triangles, each inheriting the parent's cell data.
pub(crate) fn assemble<T: PlanarTriangulator>(
    mesh: &Mesh,
    curve: &SplitCurve,
    maps: &SplitMaps,
    triangulator: &T,
    params: &IntersectionParams,
) -> Result<AssembledMesh> {
    let n_input = mesh.num_points();
    let mut points = mesh.points().to_vec();
    points.extend_from_slice(&curve.points);

    let source_pd = mesh.point_data();
    let mut point_data = source_pd.empty_like();
    for id in 0..n_input {
        point_data.copy_tuple(source_pd, id);
    }
    for (id, p) in curve.points.iter().enumerate() {
        let owner = curve.owners.get(id).copied().flatten();
        match owner.and_then(|cell| Some((mesh.triangle(cell)?, mesh.triangle_points(cell)?))) {
            Some((corners, tri)) => {
                let weights = barycentric_weights(p, &tri[0], &tri[1], &tri[2]);
                point_data.interpolate_tuple(source_pd, &corners, &weights);
            }
            None => {
                tracing::warn!(point = id, "curve point has no owning triangle, attributes zeroed");
                point_data.interpolate_tuple(source_pd, &[], &[]);
            }
        }
    }

    let mut boundary = vec![0i64; points.len()];
    for flag in &mut boundary[n_input..] {
        *flag = 1;
    }

    let links = mesh.build_links();
    let splitter = CellSplitter {
        mesh,
        links: &links,
        curve,
        maps,
        triangulator,
        tolerance: params.weld_tolerance,
    };

    let source_cd = mesh.cell_data();
    let mut cell_data = source_cd.empty_like();
    let mut polys: Vec<Vec<usize>> = Vec::with_capacity(mesh.num_cells());
    let mut split_cells = 0;
    let mut fallbacks = 0;
    let mut line_cells = vec![[None; 2]; curve.lines.len()];

    for cell in 0..mesh.num_cells() {
        let Some(corners) = mesh.triangle(cell) else {
            tracing::warn!(cell, "skipping non-triangle cell");
            continue;
        };
        if let Some(&bad) = corners.iter().find(|&&c| c >= n_input) {
            tracing::warn!(cell, point = bad, "cell refers to a missing point");
        }

        let needs_split = maps.is_cut(cell)
            || (0..3).any(|k| {
                links
                    .edge_neighbors(cell, corners[k], corners[(k + 1) % 3])
                    .any(|n| maps.is_cut(n))
            });
        if !needs_split {
            polys.push(corners.to_vec());
            cell_data.copy_tuple(source_cd, cell);
            continue;
        }

        let split = splitter.split(cell, corners);
        split_cells += 1;
        if split.fallback {
            fallbacks += 1;
        }
        for (k, on_curve) in split.corners_on_curve.iter().enumerate() {
            if *on_curve {
                if let Some(flag) = boundary.get_mut(corners[k]) {
                    *flag = 1;
                }
            }
        }
        for &(line, sub) in &split.line_borders {
            let cell = polys.len() + sub;
            match line_cells.get_mut(line) {
                Some([first @ None, _]) => *first = Some(cell),
                Some([Some(_), second @ None]) => *second = Some(cell),
                Some(_) => tracing::trace!(line, cell, "curve line already has two bordering cells"),
                None => {}
            }
        }
        for tri in split.triangles {
            polys.push(tri.to_vec());
            cell_data.copy_tuple(source_cd, cell);
        }
    }

    if params.compute_boundary_points {
        point_data.add_array(AttributeArray::int("BoundaryPoints", 1, boundary)?);
    }

    tracing::debug!(
        input_cells = mesh.num_cells(),
        output_cells = polys.len(),
        split_cells,
        fallbacks,
        "assembled split mesh"
    );

    let out = Mesh::new(points, polys)?
        .with_point_data(point_data)
        .with_cell_data(cell_data);
    Ok(AssembledMesh {
        mesh: out,
        line_cells,
        split_cells,
        fallbacks,
    })
}
