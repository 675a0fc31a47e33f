pub mod attributes;
pub mod check;
pub mod links;

pub use attributes::{AttributeArray, AttributeData, AttributeValues};
pub use check::{check_mesh, MeshQuality};
pub use links::EdgeLinks;

use crate::error::{GeometryError, Result};
use crate::math::Point3;

/// A surface mesh: points, polygonal cells and their attribute data.
///
/// The intersection pipeline only processes triangles. Other cells are kept
/// in the container so they can be reported and skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    points: Vec<Point3>,
    polys: Vec<Vec<usize>>,
    point_data: AttributeData,
    cell_data: AttributeData,
}

impl Mesh {
    /// Creates a mesh from points and polygonal cells.
    ///
    /// Point indices are not validated here; out-of-range indices are
    /// reported when the cell is used.
    ///
    /// # Errors
    ///
    /// Returns an error if a point has a non-finite coordinate.
    pub fn new(points: Vec<Point3>, polys: Vec<Vec<usize>>) -> Result<Self> {
        if let Some(i) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(GeometryError::NonFinite(i).into());
        }
        Ok(Self {
            points,
            polys,
            point_data: AttributeData::new(),
            cell_data: AttributeData::new(),
        })
    }

    /// Creates a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a point has a non-finite coordinate.
    pub fn from_triangles(points: Vec<Point3>, triangles: &[[usize; 3]]) -> Result<Self> {
        Self::new(points, triangles.iter().map(|t| t.to_vec()).collect())
    }

    /// Attaches point data. Arrays must have one tuple per point.
    #[must_use]
    pub fn with_point_data(mut self, data: AttributeData) -> Self {
        self.point_data = data;
        self
    }

    /// Attaches cell data. Arrays must have one tuple per cell.
    #[must_use]
    pub fn with_cell_data(mut self, data: AttributeData) -> Self {
        self.cell_data = data;
        self
    }

    /// Returns all points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns all cells.
    #[must_use]
    pub fn polys(&self) -> &[Vec<usize>] {
        &self.polys
    }

    /// Returns the number of points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.polys.len()
    }

    /// Returns the point with the given index.
    #[must_use]
    pub fn point(&self, id: usize) -> Option<&Point3> {
        self.points.get(id)
    }

    /// Returns the point ids of a cell.
    #[must_use]
    pub fn cell(&self, id: usize) -> Option<&[usize]> {
        self.polys.get(id).map(Vec::as_slice)
    }

    /// Returns the point ids of a cell if it is a triangle.
    #[must_use]
    pub fn triangle(&self, id: usize) -> Option<[usize; 3]> {
        match self.cell(id)? {
            &[a, b, c] => Some([a, b, c]),
            _ => None,
        }
    }

    /// Returns the corner positions of a triangle cell.
    ///
    /// Returns `None` if the cell is not a triangle or references a missing point.
    #[must_use]
    pub fn triangle_points(&self, id: usize) -> Option<[Point3; 3]> {
        let [a, b, c] = self.triangle(id)?;
        Some([*self.point(a)?, *self.point(b)?, *self.point(c)?])
    }

    /// Returns the point attribute data.
    #[must_use]
    pub fn point_data(&self) -> &AttributeData {
        &self.point_data
    }

    /// Returns the point attribute data for modification.
    pub fn point_data_mut(&mut self) -> &mut AttributeData {
        &mut self.point_data
    }

    /// Returns the cell attribute data.
    #[must_use]
    pub fn cell_data(&self) -> &AttributeData {
        &self.cell_data
    }

    /// Returns the cell attribute data for modification.
    pub fn cell_data_mut(&mut self) -> &mut AttributeData {
        &mut self.cell_data
    }

    /// Appends a point and returns its index.
    pub fn push_point(&mut self, point: Point3) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Appends a cell and returns its index.
    pub fn push_cell(&mut self, cell: Vec<usize>) -> usize {
        self.polys.push(cell);
        self.polys.len() - 1
    }

    /// Builds the edge-to-cell adjacency of the mesh.
    #[must_use]
    pub fn build_links(&self) -> EdgeLinks {
        EdgeLinks::build(self)
    }
}
