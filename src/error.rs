use thiserror::Error;

/// Top-level error type for mesh intersection and splitting.
#[derive(Debug, Error)]
pub enum MeshcutError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("non-finite coordinate at point {0}")]
    NonFinite(usize),
}

/// Errors related to mesh containers and their attribute arrays.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("attribute array `{name}` has {len} values, expected a multiple of {components}")]
    AttributeShape {
        name: String,
        len: usize,
        components: usize,
    },
}

/// Errors related to the intersection pipeline.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to planar triangulation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid triangulation input: {0}")]
    InvalidParameters(String),

    #[error("triangulation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`MeshcutError`].
pub type Result<T> = std::result::Result<T, MeshcutError>;
