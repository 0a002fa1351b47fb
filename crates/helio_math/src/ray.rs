//! Ray type shared by the camera, the scene and the integrator.

use glam::{DMat4, DVec3};

/// A path of light with an origin and a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point reached after travelling `t` along the ray.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Applies an affine transform to the ray.
    ///
    /// The origin takes the full matrix; the direction takes the matrix
    /// with its translation stripped (a direction has no position) and
    /// is renormalized so scaling transforms keep it unit length.
    pub fn transform(&self, m: &DMat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction).normalize(),
        }
    }
}
