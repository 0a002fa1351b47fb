//! Shape trait consumed by the BVH.

use helio_math::{Aabb, DVec3, Ray};

/// A ray/shape intersection in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Distance from the ray origin along its direction.
    pub distance: f64,
    /// The intersection point.
    pub point: DVec3,
    /// Unit surface normal at the point, oriented by the shape's
    /// winding (not flipped toward the ray).
    pub normal: DVec3,
}

/// Anything that occupies 3D space: it can be indexed by the BVH and
/// intersected by rays.
pub trait Shape: Send + Sync {
    /// Tight axis-aligned box around the shape.
    fn bounding_box(&self) -> Aabb;

    /// Nearest intersection in front of the ray origin, if any.
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;

    /// Whether any part of the shape overlaps the box. Used to assign
    /// shapes to tree cells, so it must never report `false` for a box
    /// the shape actually touches.
    fn intersects_box(&self, bbox: &Aabb) -> bool;
}
