//! Scene data for the helio path tracer.
//!
//! This crate owns the renderer-agnostic triangle soup (`TriangleMesh`)
//! and the Wavefront OBJ/MTL loader that produces it. No rendering code
//! lives here.

mod mesh;
pub mod obj;

pub use mesh::{MeshMaterial, MeshTriangle, TriangleMesh};
