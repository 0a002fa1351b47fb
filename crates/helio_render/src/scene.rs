//! Scene assembly: loaded meshes become BVH-indexed triangle scenes.

use helio_core::TriangleMesh;
use helio_math::{Aabb, Ray};
use log::info;

use crate::bvh::TreeNode;
use crate::hit::Hit;
use crate::material::{Material, Surface};
use crate::shape::{Intersection, Shape};
use crate::triangle::Triangle;

/// A collection of geometry that can be rendered into color.
pub trait Scene: Send + Sync {
    /// Finds the first geometry the ray passes through and the material
    /// responsible for shading it.
    fn intersect(&self, ray: &Ray) -> Option<(Hit, &dyn Material)>;
}

/// A triangle scene built from a loaded mesh, indexed by a BVH that is
/// constructed once and read-only afterwards.
pub struct MeshScene {
    triangles: Vec<Triangle>,
    surfaces: Vec<Surface>,
    root: Option<TreeNode>,
}

impl MeshScene {
    pub fn new(mesh: &TriangleMesh) -> Self {
        let triangles: Vec<Triangle> = mesh.triangles.iter().map(Triangle::from_mesh).collect();
        let surfaces: Vec<Surface> = mesh.materials.iter().map(Surface::from_mesh).collect();

        let root = triangles
            .iter()
            .map(|t| t.bounding_box())
            .reduce(|a, b| a.union(&b))
            .and_then(|scene_box| {
                let candidates: Vec<usize> = (0..triangles.len()).collect();
                TreeNode::build(&triangles, &candidates, scene_box)
            });

        if let Some(node) = &root {
            info!(
                "indexed {} triangles into {} leaves",
                triangles.len(),
                node.leaf_count()
            );
        }

        Self {
            triangles,
            surfaces,
            root,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Bounding box of the whole scene, when it has any geometry.
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|node| *node.bbox())
    }

    /// Reference nearest-hit search scanning every triangle. The BVH
    /// traversal must agree with this on any ray.
    pub fn intersect_linear(&self, ray: &Ray) -> Option<(usize, Intersection)> {
        let mut closest: Option<(usize, Intersection)> = None;
        for (index, triangle) in self.triangles.iter().enumerate() {
            let Some(intersection) = triangle.intersect(ray) else {
                continue;
            };
            match &closest {
                Some((_, nearest)) if nearest.distance <= intersection.distance => {}
                _ => closest = Some((index, intersection)),
            }
        }
        closest
    }

    fn resolve(&self, ray: &Ray, index: usize, intersection: Intersection) -> (Hit, &dyn Material) {
        let hit = Hit::new(*ray, intersection.point, intersection.normal);
        let surface = &self.surfaces[self.triangles[index].material()];
        (hit, surface as &dyn Material)
    }
}

impl Scene for MeshScene {
    fn intersect(&self, ray: &Ray) -> Option<(Hit, &dyn Material)> {
        let root = self.root.as_ref()?;
        let (index, intersection) = root.intersect(&self.triangles, ray)?;
        Some(self.resolve(ray, index, intersection))
    }
}
