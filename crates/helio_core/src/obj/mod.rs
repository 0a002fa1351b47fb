//! Wavefront OBJ/MTL loading.
//!
//! The loader takes two byte streams (geometry and material library)
//! and produces a [`TriangleMesh`](crate::TriangleMesh). `mtllib`
//! statements inside the OBJ stream are ignored because the caller
//! already supplies the library.

mod mtl;
mod parser;

pub use mtl::parse_mtl;
pub use parser::{load, parse_obj, ObjError, ObjResult};
