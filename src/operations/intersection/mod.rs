mod assemble;
mod candidates;
mod cell_split;
mod context;
mod curve;
mod line_split;
mod params;

pub use curve::IntersectionCurve;
pub use params::IntersectionParams;

use crate::error::Result;
use crate::mesh::{check_mesh, Mesh, MeshQuality};
use crate::spatial::AabbTree;
use crate::tessellation::{ConstrainedTriangulator, PlanarTriangulator};

use self::assemble::assemble;
use self::candidates::find_intersections;
use self::context::IntersectionContext;
use self::line_split::split_lines;

/// Output of [`IntersectMeshes`].
#[derive(Debug, Clone)]
pub struct IntersectionResult {
    /// The welded intersection curve.
    pub curve: IntersectionCurve,
    /// The first mesh, split along the curve unless splitting was disabled.
    pub first: Mesh,
    /// The second mesh, split along the curve unless splitting was disabled.
    pub second: Mesh,
    /// Edge statistics of the split first mesh, when checking was requested.
    pub first_quality: Option<MeshQuality>,
    /// Edge statistics of the split second mesh, when checking was requested.
    pub second_quality: Option<MeshQuality>,
}

impl IntersectionResult {
    /// Number of curve points.
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.curve.num_points()
    }

    /// Number of curve lines.
    #[must_use]
    pub fn number_of_lines(&self) -> usize {
        self.curve.num_lines()
    }

    /// The curve as a polyline mesh. See [`IntersectionCurve::to_mesh`].
    ///
    /// # Errors
    ///
    /// Returns an error if the curve mesh cannot be built.
    pub fn curve_mesh(&self) -> Result<Mesh> {
        self.curve.to_mesh()
    }
}

/// Intersects two triangle meshes and splits both along the intersection
/// curve.
pub struct IntersectMeshes<'a> {
    first: &'a Mesh,
    second: &'a Mesh,
    params: IntersectionParams,
}

impl<'a> IntersectMeshes<'a> {
    /// Creates a new `IntersectMeshes` operation with default parameters.
    #[must_use]
    pub fn new(first: &'a Mesh, second: &'a Mesh) -> Self {
        Self {
            first,
            second,
            params: IntersectionParams::default(),
        }
    }

    /// Replaces all parameters.
    #[must_use]
    pub fn params(mut self, params: IntersectionParams) -> Self {
        self.params = params;
        self
    }

    /// Enables or disables splitting of the first mesh.
    #[must_use]
    pub fn split_first(mut self, split: bool) -> Self {
        self.params.split_first = split;
        self
    }

    /// Enables or disables splitting of the second mesh.
    #[must_use]
    pub fn split_second(mut self, split: bool) -> Self {
        self.params.split_second = split;
        self
    }

    /// Executes the operation with the default constrained triangulator.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or an output mesh
    /// cannot be built.
    pub fn execute(&self) -> Result<IntersectionResult> {
        self.execute_with(&ConstrainedTriangulator::new())
    }

    /// Executes the operation, re-triangulating cut triangles with
    /// `triangulator`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or an output mesh
    /// cannot be built.
    pub fn execute_with<T: PlanarTriangulator>(&self, triangulator: &T) -> Result<IntersectionResult> {
        let params = &self.params;
        params.validate()?;
        let meshes = [self.first, self.second];

        let trees = meshes.map(|m| AabbTree::build(m, params.cells_per_leaf, params.weld_tolerance));
        let mut ctx = IntersectionContext::new(params.weld_tolerance);
        find_intersections(&mut ctx, meshes, [&trees[0], &trees[1]], params);

        if ctx.curve.is_empty() {
            tracing::warn!("no intersection between the meshes");
            return Ok(IntersectionResult {
                curve: ctx.curve,
                first: self.first.clone(),
                second: self.second.clone(),
                first_quality: None,
                second_quality: None,
            });
        }

        let mut outputs: [(Mesh, Option<MeshQuality>); 2] = Default::default();
        for (index, split) in [params.split_first, params.split_second].into_iter().enumerate() {
            let mesh = meshes[index];
            if !split {
                outputs[index] = (mesh.clone(), None);
                continue;
            }
            let maps = &ctx.maps[index];
            let curve = split_lines(mesh, &ctx.curve, maps, params.weld_tolerance);
            let assembled = assemble(mesh, &curve, maps, triangulator, params)?;
            tracing::debug!(
                mesh = index,
                cut_cells = maps.num_cut_cells(),
                split_cells = assembled.split_cells,
                fallbacks = assembled.fallbacks,
                "split mesh"
            );
            ctx.curve.set_new_cells(index, assembled.line_cells);
            let mut out = assembled.mesh;
            let quality = if params.check_mesh {
                Some(check_mesh(&mut out)?)
            } else {
                None
            };
            outputs[index] = (out, quality);
        }

        let [(first, first_quality), (second, second_quality)] = outputs;
        Ok(IntersectionResult {
            curve: ctx.curve,
            first,
            second,
            first_quality,
            second_quality,
        })
    }
}
