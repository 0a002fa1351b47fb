//! Monte Carlo path tracer over triangle scenes.
//!
//! The pipeline: the [`render`] loop drives a [`Camera`] to produce
//! rays, each ray goes through the path [`integrator`](sample_scene),
//! which queries a [`Scene`] (BVH-backed) for the nearest hit and lets
//! the hit [`Material`] recurse for incoming radiance. Averaged colors
//! land in an [`ImageSink`].

mod bvh;
mod camera;
mod hit;
mod integrator;
mod material;
mod png;
mod renderer;
mod scene;
mod shape;
mod triangle;

pub use bvh::TreeNode;
pub use camera::{Camera, Perspective};
pub use hit::Hit;
pub use integrator::sample_scene;
pub use material::{
    cosine_bounce, diffuse_bounce, gen_f64, specular_bounce, Color, Material, Surface,
};
pub use png::Png8;
pub use renderer::{render, ImageSink, RenderSettings};
pub use scene::{MeshScene, Scene};
pub use shape::{Intersection, Shape};
pub use triangle::Triangle;

/// Re-export the math types the public API speaks in.
pub use helio_math::{Aabb, DMat4, DVec2, DVec3, Ray, EPS};
