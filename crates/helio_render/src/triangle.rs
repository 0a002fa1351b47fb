//! Triangle primitive.

use helio_core::MeshTriangle;
use helio_math::{Aabb, DVec2, DVec3, Ray};

use crate::shape::{Intersection, Shape};

/// A renderable triangle: three vertices, the attributes the loader
/// knows about them, and the index of the surface that shades it.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [DVec3; 3],
    normals: [DVec3; 3],
    uvs: [DVec2; 3],
    material: usize,
    smooth: bool,
    bbox: Aabb,
}

impl Triangle {
    /// Creates a bare triangle. Winding determines the normal: counter-
    /// clockwise vertices seen from outside give an outward normal,
    /// which also becomes the shading normal at each vertex.
    pub fn new(v0: DVec3, v1: DVec3, v2: DVec3, material: usize) -> Self {
        let normal = (v0 - v1).cross(v0 - v2).normalize();
        Self::with_attributes(
            [v0, v1, v2],
            [normal; 3],
            [DVec2::ZERO; 3],
            material,
            false,
        )
    }

    /// Creates a triangle with per-vertex shading normals and texture
    /// coordinates supplied by a loader.
    pub fn with_attributes(
        vertices: [DVec3; 3],
        normals: [DVec3; 3],
        uvs: [DVec2; 3],
        material: usize,
        smooth: bool,
    ) -> Self {
        let [v0, v1, v2] = vertices;
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        Self {
            vertices,
            normals,
            uvs,
            material,
            smooth,
            bbox: Aabb::new(min, max),
        }
    }

    pub fn from_mesh(triangle: &MeshTriangle) -> Self {
        Self::with_attributes(
            triangle.vertices,
            triangle.normals,
            triangle.uvs,
            triangle.material,
            triangle.smooth,
        )
    }

    pub fn vertices(&self) -> [DVec3; 3] {
        self.vertices
    }

    /// Per-vertex shading normals, as loaded.
    pub fn normals(&self) -> [DVec3; 3] {
        self.normals
    }

    /// Per-vertex texture coordinates, as loaded.
    pub fn uvs(&self) -> [DVec2; 3] {
        self.uvs
    }

    /// Index into the owning scene's material table.
    pub fn material(&self) -> usize {
        self.material
    }

    /// Whether the face belongs to a smoothing group.
    pub fn smooth(&self) -> bool {
        self.smooth
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Plane intersection followed by three edge half-plane tests.
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let [v0, v1, v2] = self.vertices;
        let normal = (v0 - v1).cross(v0 - v2);

        // Both the direction and (once normalized) the normal are unit
        // vectors, so this dot product is the cosine between them. Zero
        // means the ray never crosses the triangle's plane.
        let normal = normal.normalize();
        let cosine = ray.direction.dot(normal);
        if cosine.abs() < f64::MIN_POSITIVE {
            return None;
        }

        // Distance from the ray origin to the plane, measured along the
        // ray: the perpendicular distance divided by the cosine.
        let distance = normal.dot(v0 - ray.origin) / cosine;
        if distance <= 0.0 {
            return None;
        }

        let point = ray.at(distance);

        // The point lies on the plane; it is inside the triangle iff it
        // sits on the inner side of all three edges.
        let edges = [(v0, v1), (v1, v2), (v2, v0)];
        for (from, to) in edges {
            let cross = (to - from).cross(point - from);
            if normal.dot(cross) < 0.0 {
                return None;
            }
        }

        Some(Intersection {
            distance,
            point,
            normal,
        })
    }

    fn intersects_box(&self, bbox: &Aabb) -> bool {
        let [v0, v1, v2] = self.vertices;
        bbox.intersects_triangle(v0, v1, v2)
    }
}
