//! Bounding volume hierarchy over shape indices.
//!
//! The root node's box encloses the whole scene. Each branch splits its
//! box evenly along the longest axis, so sibling boxes never overlap
//! and traversal can visit them strictly front to back. Leaves hold the
//! indices of every shape overlapping their box; a large shape may
//! appear in many leaves.

use helio_math::{Aabb, Ray, EPS};

use crate::shape::{Intersection, Shape};

/// A node in the shape index tree.
///
/// Branches carry no shape indices and always have both children;
/// leaves carry a nonzero number of indices and no children.
pub enum TreeNode {
    Branch {
        bbox: Aabb,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        bbox: Aabb,
        shapes: Vec<usize>,
    },
}

/// Leaf threshold: cells holding this few shapes stop subdividing.
const LEAF_MAX_SHAPES: usize = 3;

impl TreeNode {
    /// Builds the tree cell for `bbox` out of the candidate shape
    /// indices, returning `None` when no candidate overlaps the box.
    ///
    /// Subdivision also stops once the cell is notably smaller than the
    /// smallest shape left in it (quadruple the cell diagonal below the
    /// smallest shape diagonal), which happens around corners shared by
    /// several large faces. The two halves of a split build in
    /// parallel.
    ///
    /// Panics if both halves of a split lose every candidate — the box
    /// covered those shapes, so a sound `intersects_box` must keep each
    /// of them in at least one half.
    pub fn build<S: Shape>(shapes: &[S], candidates: &[usize], bbox: Aabb) -> Option<TreeNode> {
        let indexes: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&index| shapes[index].intersects_box(&bbox))
            .collect();

        if indexes.is_empty() {
            return None;
        }

        if indexes.len() <= LEAF_MAX_SHAPES {
            return Some(TreeNode::Leaf {
                bbox,
                shapes: indexes,
            });
        }

        let min_shape_len = indexes
            .iter()
            .map(|&index| shapes[index].bounding_box().diagonal().length())
            .fold(f64::INFINITY, f64::min);
        if bbox.diagonal().length() * 4.0 < min_shape_len || min_shape_len < EPS {
            return Some(TreeNode::Leaf {
                bbox,
                shapes: indexes,
            });
        }

        let (box_a, box_b) = bbox.split();
        let (node_a, node_b) = rayon::join(
            || Self::build(shapes, &indexes, box_a),
            || Self::build(shapes, &indexes, box_b),
        );

        match (node_a, node_b) {
            (Some(left), Some(right)) => Some(TreeNode::Branch {
                bbox,
                left: Box::new(left),
                right: Box::new(right),
            }),
            // A lone child replaces the would-be branch so lookups
            // skip the middleman.
            (Some(node), None) | (None, Some(node)) => Some(node),
            (None, None) => panic!("shapes were dropped while building the tree"),
        }
    }

    pub fn bbox(&self) -> &Aabb {
        match self {
            TreeNode::Branch { bbox, .. } => bbox,
            TreeNode::Leaf { bbox, .. } => bbox,
        }
    }

    /// Number of leaves under this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
            TreeNode::Leaf { .. } => 1,
        }
    }

    /// Finds the nearest shape the ray hits, descending the closer
    /// child first and trying the farther one only when the closer
    /// yields nothing.
    pub fn intersect<S: Shape>(&self, shapes: &[S], ray: &Ray) -> Option<(usize, Intersection)> {
        match self {
            TreeNode::Branch { left, right, .. } => {
                let hit_left = left.bbox().intersect_ray(ray);
                let hit_right = right.bbox().intersect_ray(ray);

                match (hit_left, hit_right) {
                    (Some((left_tmin, _)), Some((right_tmin, _))) => {
                        // Sibling boxes never overlap, so entry
                        // distances order the descent.
                        let (near, far) = if left_tmin < right_tmin {
                            (left, right)
                        } else {
                            (right, left)
                        };
                        near.intersect(shapes, ray)
                            .or_else(|| far.intersect(shapes, ray))
                    }
                    (Some(_), None) => left.intersect(shapes, ray),
                    (None, Some(_)) => right.intersect(shapes, ray),
                    (None, None) => None,
                }
            }
            TreeNode::Leaf {
                bbox,
                shapes: indexes,
            } => {
                let (tmin, tmax) = bbox.intersect_ray(ray)?;

                let mut closest: Option<(usize, Intersection)> = None;
                for &index in indexes {
                    let Some(intersection) = shapes[index].intersect(ray) else {
                        continue;
                    };

                    // A shape extending past this cell (a ground plane,
                    // say) may intersect the ray far outside it; that
                    // hit belongs to whichever cell contains it.
                    if intersection.distance < tmin || intersection.distance > tmax {
                        continue;
                    }

                    match &closest {
                        Some((_, nearest)) if nearest.distance <= intersection.distance => {}
                        _ => closest = Some((index, intersection)),
                    }
                }
                closest
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle::Triangle;
    use helio_math::DVec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// A wall of unit-ish triangles in the x = `x` plane.
    fn wall(x: f64, count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|i| {
                let y = i as f64;
                Triangle::new(
                    DVec3::new(x, y, -1.0),
                    DVec3::new(x, y + 1.0, 0.0),
                    DVec3::new(x, y, 1.0),
                    0,
                )
            })
            .collect()
    }

    fn scene_box(shapes: &[Triangle]) -> Aabb {
        shapes
            .iter()
            .map(|s| s.bounding_box())
            .reduce(|a, b| a.union(&b))
            .expect("at least one shape")
    }

    fn build_all(shapes: &[Triangle]) -> TreeNode {
        let candidates: Vec<usize> = (0..shapes.len()).collect();
        TreeNode::build(shapes, &candidates, scene_box(shapes)).expect("tree is not empty")
    }

    fn random_triangles(rng: &mut StdRng, count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|_| {
                let base = DVec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let jitter = |rng: &mut StdRng| {
                    DVec3::new(
                        rng.gen_range(-1.5..1.5),
                        rng.gen_range(-1.5..1.5),
                        rng.gen_range(-1.5..1.5),
                    )
                };
                Triangle::new(base, base + jitter(rng), base + jitter(rng), 0)
            })
            .collect()
    }

    /// Reference implementation: scan every shape.
    fn linear_nearest(shapes: &[Triangle], ray: &Ray) -> Option<(usize, Intersection)> {
        let mut closest: Option<(usize, Intersection)> = None;
        for (index, shape) in shapes.iter().enumerate() {
            if let Some(intersection) = shape.intersect(ray) {
                match &closest {
                    Some((_, nearest)) if nearest.distance <= intersection.distance => {}
                    _ => closest = Some((index, intersection)),
                }
            }
        }
        closest
    }

    /// Collects which leaves each shape index appears in.
    fn leaf_membership(node: &TreeNode, out: &mut Vec<(usize, Aabb)>) {
        match node {
            TreeNode::Branch { left, right, .. } => {
                leaf_membership(left, out);
                leaf_membership(right, out);
            }
            TreeNode::Leaf { bbox, shapes } => {
                for &index in shapes {
                    out.push((index, *bbox));
                }
            }
        }
    }

    #[test]
    fn test_small_set_becomes_leaf() {
        let shapes = wall(0.0, 3);
        let tree = build_all(&shapes);
        assert!(matches!(tree, TreeNode::Leaf { .. }));
    }

    #[test]
    fn test_larger_set_subdivides() {
        let shapes = wall(0.0, 32);
        let tree = build_all(&shapes);
        assert!(matches!(tree, TreeNode::Branch { .. }));
        assert!(tree.leaf_count() > 1);
    }

    #[test]
    fn test_nearest_of_two_walls() {
        let mut shapes = wall(2.0, 8);
        shapes.extend(wall(5.0, 8));
        let tree = build_all(&shapes);

        let ray = Ray::new(DVec3::new(0.0, 0.5, 0.0), DVec3::X);
        let (index, intersection) = tree.intersect(&shapes, &ray).expect("ray should hit");
        assert!(index < 8, "hit should come from the near wall");
        assert!((intersection.distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_miss_returns_none() {
        let shapes = wall(2.0, 8);
        let tree = build_all(&shapes);
        let ray = Ray::new(DVec3::ZERO, DVec3::new(-1.0, 0.0, 0.0));
        assert!(tree.intersect(&shapes, &ray).is_none());
    }

    #[test]
    fn test_every_shape_lands_in_an_overlapping_leaf() {
        let mut rng = StdRng::seed_from_u64(7);
        let shapes = random_triangles(&mut rng, 64);
        let tree = build_all(&shapes);

        let mut membership = Vec::new();
        leaf_membership(&tree, &mut membership);

        for index in 0..shapes.len() {
            let holds = membership
                .iter()
                .any(|(i, bbox)| *i == index && shapes[index].intersects_box(bbox));
            assert!(holds, "shape {} is in no overlapping leaf", index);
        }
    }

    #[test]
    fn test_traversal_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(11);
        let shapes = random_triangles(&mut rng, 128);
        let tree = build_all(&shapes);

        for _ in 0..500 {
            let origin = DVec3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
            );
            let direction = DVec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if direction.length() < 1e-3 {
                continue;
            }
            let ray = Ray::new(origin, direction);

            let from_tree = tree.intersect(&shapes, &ray);
            let from_scan = linear_nearest(&shapes, &ray);

            match (from_tree, from_scan) {
                (None, None) => {}
                (Some((_, a)), Some((_, b))) => {
                    assert!(
                        (a.distance - b.distance).abs() < 1e-9,
                        "tree hit at {} but scan at {}",
                        a.distance,
                        b.distance
                    );
                }
                (tree_hit, scan_hit) => panic!(
                    "tree and scan disagree: tree={:?} scan={:?}",
                    tree_hit.map(|h| h.1.distance),
                    scan_hit.map(|h| h.1.distance)
                ),
            }
        }
    }
}
