//! Materials and the bounce helpers they are built from.

use helio_core::MeshMaterial;
use helio_math::{arbitrary_orthogonal, DVec3, Ray, EPS};
use rand::RngCore;

use crate::hit::Hit;

/// RGB radiance. Addition is channelwise; multiplication is channelwise
/// filtering. Values may exceed [0, 1] — clamping belongs to the image
/// encoder.
pub type Color = DVec3;

/// Describes how a surface turns incoming radiance into outgoing
/// radiance.
///
/// The sampler evaluates a new ray at reduced bounce depth; it is the
/// integrator's recursion handle. Materials are encouraged to send rays
/// back into the scene through it in order to reach a light source.
/// Materials can also be lights themselves.
pub trait Material: Send + Sync {
    fn sample(
        &self,
        rng: &mut dyn RngCore,
        hit: &Hit,
        sampler: &mut dyn FnMut(&mut dyn RngCore, Ray) -> Color,
    ) -> Color;
}

/// Generates a random f64 in [0, 1) from an `RngCore`.
///
/// `dyn RngCore` can't use `Rng::gen` directly; this mirrors the
/// standard distribution's bit trick.
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    let bits = rng.next_u64();
    (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Returns a unit vector uniformly distributed over the hemisphere
/// around `normal`.
///
/// Draws points from the cube [-1, 1]^3, keeps those strictly inside
/// the unit ball (and not degenerately close to the origin), normalizes
/// and flips any that land under the surface. No cosine weighting is
/// applied; the diffuse lobe folds that factor into its reflectance.
pub fn diffuse_bounce(rng: &mut dyn RngCore, normal: DVec3) -> DVec3 {
    loop {
        let vector = DVec3::new(
            gen_f64(rng) * 2.0 - 1.0,
            gen_f64(rng) * 2.0 - 1.0,
            gen_f64(rng) * 2.0 - 1.0,
        );

        let length = vector.length();
        if length >= 1.0 || length < EPS {
            continue;
        }

        let vector = vector / length;
        if vector.dot(normal) < 0.0 {
            return -vector;
        }
        return vector;
    }
}

/// Reflects the incident direction across the normal.
///
/// Both inputs are unit vectors. The dot product is the incident ray's
/// height against the normal (negated, since they point in opposite
/// directions); doubling it and adding the incident back lands on the
/// mirror direction.
pub fn specular_bounce(normal: DVec3, incident: DVec3) -> DVec3 {
    incident + normal * (2.0 * -incident.dot(normal))
}

/// Returns a cosine-weighted direction over the hemisphere around
/// `normal`, the physically-based alternative to [`diffuse_bounce`]
/// (Malley's method: uniform disk sample projected up).
pub fn cosine_bounce(rng: &mut dyn RngCore, normal: DVec3) -> DVec3 {
    let r1 = gen_f64(rng);
    let r2 = gen_f64(rng);

    let radius = r1.sqrt();
    let theta = 2.0 * std::f64::consts::PI * r2;
    let x = radius * theta.cos();
    let y = radius * theta.sin();
    let z = (1.0 - r1).sqrt();

    let tangent = arbitrary_orthogonal(normal).normalize();
    let bitangent = normal.cross(tangent);

    tangent * x + bitangent * y + normal * z
}

/// The surface loaded from a material library: a diffuse lobe, a
/// perfect-mirror specular lobe and an emissive term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
}

impl Surface {
    pub fn from_mesh(material: &MeshMaterial) -> Self {
        Self {
            diffuse: material.diffuse,
            specular: material.specular,
            emissive: material.emissive,
        }
    }

    /// A lobe contributes when any of its channels carries energy.
    fn lit(color: Color) -> bool {
        color.x >= EPS || color.y >= EPS || color.z >= EPS
    }
}

impl Material for Surface {
    fn sample(
        &self,
        rng: &mut dyn RngCore,
        hit: &Hit,
        sampler: &mut dyn FnMut(&mut dyn RngCore, Ray) -> Color,
    ) -> Color {
        let mut color = Color::ZERO;

        if Self::lit(self.diffuse) {
            let ray = Ray::new(
                hit.position,
                diffuse_bounce(rng, hit.normal.direction),
            );
            color += sampler(rng, ray) * self.diffuse;
        }

        if Self::lit(self.specular) {
            // TODO: account for specular glossiness and filter this
            // lobe by the specular color instead of the diffuse one.
            let ray = Ray::new(
                hit.position,
                specular_bounce(hit.normal.direction, hit.from.direction),
            );
            color += sampler(rng, ray) * self.diffuse;
        }

        color + self.emissive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_hit() -> Hit {
        Hit::new(
            Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::new(0.0, -1.0, 0.0)),
            DVec3::ZERO,
            DVec3::Y,
        )
    }

    #[test]
    fn test_diffuse_bounce_stays_in_hemisphere() {
        let mut rng = StdRng::seed_from_u64(1);
        let normal = DVec3::new(1.0, 2.0, -0.5).normalize();
        for _ in 0..200 {
            let v = diffuse_bounce(&mut rng, normal);
            assert!((v.length() - 1.0).abs() < 1e-12);
            assert!(v.dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_specular_bounce_mirrors_across_normal() {
        let incident = DVec3::new(1.0, -1.0, 0.0).normalize();
        let reflected = specular_bounce(DVec3::Y, incident);
        let expected = DVec3::new(1.0, 1.0, 0.0).normalize();
        assert!((reflected - expected).length() < 1e-12);
    }

    #[test]
    fn test_grazing_specular_bounce_is_unchanged() {
        let incident = DVec3::X;
        assert_eq!(specular_bounce(DVec3::Y, incident), incident);
    }

    #[test]
    fn test_cosine_bounce_stays_in_hemisphere() {
        let mut rng = StdRng::seed_from_u64(2);
        let normal = DVec3::new(-0.2, 0.3, 1.0).normalize();
        for _ in 0..200 {
            let v = cosine_bounce(&mut rng, normal);
            assert!((v.length() - 1.0).abs() < 1e-9);
            assert!(v.dot(normal) >= -1e-12);
        }
    }

    #[test]
    fn test_emissive_only_surface_ignores_sampler() {
        let surface = Surface {
            emissive: Color::new(2.0, 3.0, 4.0),
            ..Surface::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let mut calls = 0;
        let color = surface.sample(&mut rng, &test_hit(), &mut |_, _| {
            calls += 1;
            Color::ONE
        });

        assert_eq!(color, Color::new(2.0, 3.0, 4.0));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_diffuse_surface_filters_sampled_radiance() {
        let surface = Surface {
            diffuse: Color::new(0.5, 0.25, 0.0),
            ..Surface::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let color = surface.sample(&mut rng, &test_hit(), &mut |_, ray| {
            // The bounce must leave the surface upward.
            assert!(ray.direction.y >= 0.0);
            Color::splat(2.0)
        });

        assert_eq!(color, Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_specular_lobe_reflects_and_uses_diffuse_filter() {
        let surface = Surface {
            diffuse: Color::new(0.5, 0.5, 0.5),
            specular: Color::new(1.0, 1.0, 1.0),
            ..Surface::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut directions = Vec::new();
        let color = surface.sample(&mut rng, &test_hit(), &mut |_, ray| {
            directions.push(ray.direction);
            Color::ONE
        });

        // Diffuse and specular lobes both fired, both filtered by the
        // diffuse color.
        assert_eq!(directions.len(), 2);
        assert_eq!(color, Color::splat(1.0));

        // The incoming ray points straight down, so the mirror
        // direction points straight back up.
        assert!((directions[1] - DVec3::Y).length() < 1e-12);
    }
}
