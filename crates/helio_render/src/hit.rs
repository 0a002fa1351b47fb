//! Hit record handed to materials.

use helio_math::{DVec2, DVec3, Ray};

/// The intersection of a ray with scene geometry, as seen by a
/// material.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// The ray that produced this hit.
    pub from: Ray,
    /// World-space intersection point.
    pub position: DVec3,
    /// Surface normal expressed as a ray anchored at the position, so
    /// materials can spawn bounce rays from it directly.
    pub normal: Ray,
    /// Texture coordinates, when the geometry carries them.
    pub uv: Option<DVec2>,
}

impl Hit {
    /// Builds a hit record, anchoring the normal ray at the position.
    pub fn new(from: Ray, position: DVec3, normal: DVec3) -> Self {
        Self {
            from,
            position,
            normal: Ray::new(position, normal),
            uv: None,
        }
    }
}
