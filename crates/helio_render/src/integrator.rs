//! Depth-bounded recursive path sampling.

use helio_math::Ray;
use rand::RngCore;

use crate::material::Color;
use crate::scene::Scene;

/// Evaluates the radiance arriving along `ray`.
///
/// Rays that exhaust their bounce budget or leave the scene contribute
/// black. Everything else defers to the hit material, handing it a
/// sampler that recurses here with one fewer bounce. The RNG threads
/// through the sampler so a material and its recursion share the
/// worker's generator.
pub fn sample_scene(
    rng: &mut dyn RngCore,
    scene: &dyn Scene,
    ray: Ray,
    bounces_left: u32,
) -> Color {
    if bounces_left == 0 {
        return Color::ZERO;
    }

    let Some((hit, material)) = scene.intersect(&ray) else {
        return Color::ZERO;
    };

    material.sample(rng, &hit, &mut |rng, next_ray| {
        sample_scene(rng, scene, next_ray, bounces_left - 1)
    })
}
