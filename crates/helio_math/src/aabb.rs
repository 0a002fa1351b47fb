//! Axis-aligned bounding box used by the BVH.

use glam::DVec3;

use crate::Ray;

/// A box aligned to the three world axes. It cannot be rotated away
/// from this orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    min: DVec3,
    max: DVec3,
}

impl Aabb {
    /// Creates a box from any two opposite corners. The corners are
    /// normalized so `min <= max` holds on every axis.
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> DVec3 {
        self.min
    }

    pub fn max(&self) -> DVec3 {
        self.max
    }

    /// The vector from the min corner to the max corner.
    pub fn diagonal(&self) -> DVec3 {
        self.max - self.min
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The eight corners of the box.
    pub fn vertices(&self) -> [DVec3; 8] {
        let (n, x) = (self.min, self.max);
        [
            DVec3::new(n.x, n.y, n.z),
            DVec3::new(x.x, n.y, n.z),
            DVec3::new(n.x, x.y, n.z),
            DVec3::new(x.x, x.y, n.z),
            DVec3::new(n.x, n.y, x.z),
            DVec3::new(x.x, n.y, x.z),
            DVec3::new(n.x, x.y, x.z),
            DVec3::new(x.x, x.y, x.z),
        ]
    }

    /// Index of the axis with the longest extent (0 = X, 1 = Y, 2 = Z).
    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Splits the box at the midpoint of its longest axis into two
    /// halves that exactly fill the original volume.
    pub fn split(&self) -> (Aabb, Aabb) {
        let d = self.diagonal();
        let (mut a_max, mut b_min) = (self.max, self.min);

        match self.longest_axis() {
            0 => {
                let middle = self.min.x + d.x / 2.0;
                a_max.x = middle;
                b_min.x = middle;
            }
            1 => {
                let middle = self.min.y + d.y / 2.0;
                a_max.y = middle;
                b_min.y = middle;
            }
            _ => {
                let middle = self.min.z + d.z / 2.0;
                a_max.z = middle;
                b_min.z = middle;
            }
        }

        (Aabb::new(self.min, a_max), Aabb::new(b_min, self.max))
    }

    /// Slab test for ray/box intersection, including rays whose origin
    /// is inside the box. Returns the entry and exit distances on a hit.
    ///
    /// Each per-axis division measures how far along the ray the plane
    /// of the box's min or max corner is crossed. A zero direction
    /// component yields an infinite distance, which the min/max folds
    /// below handle without special cases.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f64, f64)> {
        let t0 = (self.min - ray.origin) / ray.direction;
        let t1 = (self.max - ray.origin) / ray.direction;

        // The ray direction may have flipped the sign of any axis; the
        // per-component min/max restores the near and far distances.
        let tmin = t0.min(t1).max_element();
        let tmax = t0.max(t1).min_element();

        // A negative far distance means the whole box is behind the ray.
        if tmax < 0.0 || tmin > tmax {
            return None;
        }
        Some((tmin, tmax))
    }

    /// Separating-axis test between the box and a triangle.
    ///
    /// The candidate axes are the three world axes, the triangle normal
    /// and the nine cross products of triangle edges with world axes.
    /// The shapes are disjoint iff their projections onto some candidate
    /// axis are disjoint.
    pub fn intersects_triangle(&self, v0: DVec3, v1: DVec3, v2: DVec3) -> bool {
        let corners = self.vertices();
        let triangle = [v0, v1, v2];
        let edges = [v1 - v0, v2 - v1, v0 - v2];
        let world = [DVec3::X, DVec3::Y, DVec3::Z];

        let mut axes = [DVec3::ZERO; 13];
        axes[..3].copy_from_slice(&world);
        axes[3] = edges[0].cross(edges[1]);
        for (i, edge) in edges.iter().enumerate() {
            for (j, axis) in world.iter().enumerate() {
                axes[4 + i * 3 + j] = edge.cross(*axis);
            }
        }

        for axis in axes {
            let (box_lo, box_hi) = project(axis, &corners);
            let (tri_lo, tri_hi) = project(axis, &triangle);
            if box_hi < tri_lo || tri_hi < box_lo {
                return false;
            }
        }
        true
    }
}

/// Projects a point set onto an axis, returning the covered interval.
fn project(axis: DVec3, points: &[DVec3]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for p in points {
        let d = axis.dot(*p);
        lo = lo.min(d);
        hi = hi.max(d);
    }
    (lo, hi)
}
