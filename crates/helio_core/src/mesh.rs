//! Triangle soup representation produced by the loaders.
//!
//! The mesh is intentionally decoupled from the renderer's shape types:
//! it carries everything a file format can express per face, and the
//! renderer picks what it shades with.

use helio_math::{Aabb, DVec2, DVec3};

/// Surface parameters loaded from a material library.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshMaterial {
    /// Material name (from `newmtl`)
    pub name: String,
    /// Diffuse reflectance (RGB, 0-1)
    pub diffuse: DVec3,
    /// Specular reflectance (RGB, 0-1)
    pub specular: DVec3,
    /// Emitted radiance (RGB, may exceed 1)
    pub emissive: DVec3,
}

/// A single face with everything the loader knows about it.
///
/// Vertices must wind counter-clockwise when seen from outside for the
/// geometric normal to face outward.
#[derive(Clone, Debug)]
pub struct MeshTriangle {
    pub vertices: [DVec3; 3],
    /// Per-vertex shading normals; falls back to the geometric normal
    /// when the file supplies none.
    pub normals: [DVec3; 3],
    /// Per-vertex texture coordinates; zero when the file supplies none.
    pub uvs: [DVec2; 3],
    /// Index into the mesh's material table.
    pub material: usize,
    /// Whether the face belongs to a smoothing group.
    pub smooth: bool,
}

impl MeshTriangle {
    /// Unit normal derived from the winding of the three vertices.
    pub fn geometric_normal(&self) -> DVec3 {
        let [v0, v1, v2] = self.vertices;
        (v0 - v1).cross(v0 - v2).normalize()
    }
}

/// A complete loaded scene: faces plus the material table their
/// `material` indices point into.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub triangles: Vec<MeshTriangle>,
    pub materials: Vec<MeshMaterial>,
}

impl TriangleMesh {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of all vertices, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);

        for triangle in &self.triangles {
            for vertex in triangle.vertices {
                min = min.min(vertex);
                max = max.max(vertex);
            }
        }

        if min.x.is_infinite() {
            None
        } else {
            Some(Aabb::new(min, max))
        }
    }
}
