pub mod error;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod spatial;
pub mod tessellation;

pub use error::{MeshcutError, Result};
pub use operations::intersection::{IntersectMeshes, IntersectionCurve, IntersectionParams, IntersectionResult};
