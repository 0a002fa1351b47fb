//! Math kernel for the helio path tracer.
//!
//! All geometry is double precision. The vector and matrix types come
//! from glam (`DVec3`, `DMat4`, `DQuat`); this crate adds the ray and
//! axis-aligned box types plus a few basis helpers the renderer needs.

// Re-export glam for convenience
pub use glam::{DMat4, DQuat, DVec2, DVec3, DVec4};

mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::Ray;

/// The smallest value this library accepts before it is considered
/// "close enough" to zero to be declared zero.
pub const EPS: f64 = 1e-9;

/// Returns a vector perpendicular to `v`.
///
/// Crosses `v` with the standard basis axis of its smallest absolute
/// component, so the result is never the zero vector for nonzero input
/// (ties resolve in X, Y, Z order). The result is not unit length.
pub fn arbitrary_orthogonal(v: DVec3) -> DVec3 {
    let a = v.abs();
    let axis = if a.x <= a.y && a.x <= a.z {
        DVec3::X
    } else if a.y <= a.z {
        DVec3::Y
    } else {
        DVec3::Z
    };
    v.cross(axis)
}

/// Builds a transform rotating about an arbitrary axis by `radians`,
/// following the right-hand rule. The axis does not need to be unit
/// length.
pub fn axis_rotation(axis: DVec3, radians: f64) -> DMat4 {
    DMat4::from_axis_angle(axis.normalize(), radians)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_products() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        let w = DVec3::new(-4.0, 0.5, 2.0);

        assert_eq!(v.dot(w), w.dot(v));
        assert_eq!(v.cross(w), -w.cross(v));
        assert_eq!(v.cross(w).dot(v), 0.0);
        assert_eq!(v.cross(w).dot(w), 0.0);
    }

    #[test]
    fn test_normalize_is_unit_length() {
        let v = DVec3::new(3.0, -4.0, 12.0);
        let len = v.normalize().length();
        assert!(len >= 1.0 - EPS && len <= 1.0 + EPS);
    }

    #[test]
    fn test_identity_leaves_points_alone() {
        let v = DVec3::new(1.5, -2.0, 0.25);
        assert_eq!(DMat4::IDENTITY.transform_point3(v), v);
    }

    #[test]
    fn test_matrix_multiplication_associates_over_points() {
        let m = axis_rotation(DVec3::new(1.0, 2.0, -1.0), 0.7)
            * DMat4::from_translation(DVec3::new(3.0, 0.0, -2.0));
        let n = DMat4::from_scale(DVec3::splat(2.5));
        let v = DVec3::new(-1.0, 4.0, 2.0);

        let combined = (m * n).transform_point3(v);
        let stepwise = m.transform_point3(n.transform_point3(v));
        assert!((combined - stepwise).length() < 1e-12);
    }

    #[test]
    fn test_axis_rotation_right_hand_rule() {
        // Rotating X about Z by a quarter turn lands on Y.
        let m = axis_rotation(DVec3::Z, std::f64::consts::FRAC_PI_2);
        let v = m.transform_vector3(DVec3::X);
        assert!((v - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_arbitrary_orthogonal_is_perpendicular() {
        let inputs = [
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(-0.3, 0.1, 5.0),
            DVec3::X,
            DVec3::Y,
            DVec3::Z,
            DVec3::new(1.0, 1.0, 1.0),
        ];
        for v in inputs {
            let w = arbitrary_orthogonal(v);
            assert!(w.length() > 0.0, "orthogonal of {:?} collapsed to zero", v);
            assert!(v.dot(w).abs() < EPS);
        }
    }
}
