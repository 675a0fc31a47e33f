use crate::error::{OperationError, Result};
use crate::math::{COPLANAR_TOLERANCE, EDGE_TOLERANCE, WELD_TOLERANCE};

/// Parameters controlling mesh intersection and splitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionParams {
    /// Two curve points closer than this are the same point. Also used to
    /// merge points inside one split triangle and to decide whether a curve
    /// point lies on a triangle edge.
    pub weld_tolerance: f64,
    /// Maximum distance from a curve point to a triangle edge for the point
    /// to be recorded against that edge.
    pub edge_tolerance: f64,
    /// Tolerance for deciding that two supporting planes coincide.
    pub coplanar_tolerance: f64,
    /// Re-triangulate the first mesh along the curve.
    pub split_first: bool,
    /// Re-triangulate the second mesh along the curve.
    pub split_second: bool,
    /// Add a `BoundaryPoints` point array to the split meshes.
    pub compute_boundary_points: bool,
    /// Add `BadTriangle`/`FreeEdge` cell arrays to the split meshes.
    pub check_mesh: bool,
    /// Maximum number of cells in a spatial index leaf.
    pub cells_per_leaf: usize,
}

impl Default for IntersectionParams {
    fn default() -> Self {
        Self {
            weld_tolerance: WELD_TOLERANCE,
            edge_tolerance: EDGE_TOLERANCE,
            coplanar_tolerance: COPLANAR_TOLERANCE,
            split_first: true,
            split_second: true,
            compute_boundary_points: false,
            check_mesh: false,
            cells_per_leaf: 10,
        }
    }
}

impl IntersectionParams {
    /// Checks that every tolerance is finite and positive and that leaves can
    /// hold at least one cell.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("weld_tolerance", self.weld_tolerance),
            ("edge_tolerance", self.edge_tolerance),
            ("coplanar_tolerance", self.coplanar_tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OperationError::InvalidInput(format!(
                    "{name} must be finite and positive, got {value}"
                ))
                .into());
            }
        }
        if self.cells_per_leaf == 0 {
            return Err(OperationError::InvalidInput("cells_per_leaf must be at least 1".into()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = IntersectionParams::default();
        assert!(params.validate().is_ok());
        assert!(params.split_first && params.split_second);
        assert_eq!(params.cells_per_leaf, 10);
    }

    #[test]
    fn bad_values_are_rejected() {
        let nan = IntersectionParams {
            weld_tolerance: f64::NAN,
            ..IntersectionParams::default()
        };
        assert!(nan.validate().is_err());

        let negative = IntersectionParams {
            edge_tolerance: -1.0,
            ..IntersectionParams::default()
        };
        assert!(negative.validate().is_err());

        let empty_leaves = IntersectionParams {
            cells_per_leaf: 0,
            ..IntersectionParams::default()
        };
        assert!(empty_leaves.validate().is_err());
    }
}
