//! Perspective camera with a spherical lens and optional depth of
//! field.

use helio_math::{arbitrary_orthogonal, DMat4, DQuat, DVec3, Ray, EPS};
use rand::RngCore;

use crate::material::gen_f64;

/// Creates rays to send into a scene to generate an image.
///
/// `cast` ranges over [-0.5, 0.5] on each of its x and y axes across
/// the intended field of view: increasing x moves toward the right of
/// the image and increasing y toward the top.
pub trait Camera: Send + Sync {
    fn cast(&self, rng: &mut dyn RngCore, x: f64, y: f64) -> Ray;
}

/// A camera that simulates how the eye works, casting rays from a
/// point behind the lens out into the world.
///
/// Ray origins are plotted along the surface of a sphere whose size is
/// dictated by the field of view, so the "film" is a spherical cap
/// rather than a flat plane. The default orientation faces the positive
/// Z axis; a camera-to-world matrix positions it in the scene.
///
/// With depth of field, rays no longer leave straight from their spot
/// on the lens: each one is tilted so it still passes through the focal
/// point in front of the camera, which keeps that distance sharp and
/// blurs everything else.
#[derive(Debug, Clone)]
pub struct Perspective {
    field_of_view: f64, // Degrees
    depth_of_field_distance: f64,
    depth_of_field_radius: f64, // From lens
    transform: DMat4,
}

impl Perspective {
    pub fn new() -> Self {
        Self {
            field_of_view: 30.0,
            depth_of_field_distance: 0.0,
            depth_of_field_radius: 0.0,
            transform: DMat4::IDENTITY,
        }
    }

    /// Sets the full viewing angle in degrees (0 < fov < 180).
    pub fn with_field_of_view(mut self, degrees: f64) -> Self {
        self.field_of_view = degrees;
        self
    }

    /// Sets the camera-to-world transform applied to every cast ray.
    pub fn with_transform(mut self, transform: DMat4) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the focal distance and lens radius. The distance is
    /// measured in front of the transformed camera; the radius spans
    /// the circle on the lens rays get tilted across, and a radius
    /// under epsilon disables the effect.
    pub fn with_depth_of_field(mut self, distance: f64, radius: f64) -> Self {
        self.depth_of_field_distance = distance;
        self.depth_of_field_radius = radius;
        self
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for Perspective {
    fn cast(&self, rng: &mut dyn RngCore, x: f64, y: f64) -> Ray {
        let alpha = self.field_of_view.to_radians();

        // Steer the +Z view axis across the field of view. Facing +Z
        // with +Y up, the image's right-hand side lies toward -X, hence
        // the negated angles under glam's right-hand rotations.
        let rotation = DQuat::from_axis_angle(DVec3::X, -y * alpha)
            * DQuat::from_axis_angle(DVec3::Y, -x * alpha);
        let direction = rotation * DVec3::Z;

        // The lens sphere: its radius follows from using the whole
        // field of view as one unit of arc length.
        let focal_length = 1.0 / alpha;
        let center = DVec3::new(0.0, 0.0, -focal_length);
        let origin = center + direction * focal_length;

        let mut ray = Ray { origin, direction }.transform(&self.transform);

        if self.depth_of_field_radius >= EPS {
            // The point in the world that must stay in focus.
            let focal_point = ray.origin + ray.direction * self.depth_of_field_distance;

            // A perpendicular to the ray, spun around it by a random
            // amount so aperture samples surround the focal axis.
            let spin = DQuat::from_axis_angle(ray.direction, 2.0 * std::f64::consts::PI * gen_f64(rng));
            let perpendicular = spin * arbitrary_orthogonal(ray.direction).normalize();

            // Tilt the ray as if it were cast from a circle around its
            // original spot on the lens, then slide the origin back so
            // the new ray still passes through the focal point.
            let tilt = DQuat::from_axis_angle(
                perpendicular,
                self.depth_of_field_radius.atan2(self.depth_of_field_distance),
            );
            let direction = tilt * ray.direction;
            let origin = focal_point - direction * self.depth_of_field_distance;

            ray = Ray::new(origin, direction);
        }

        ray
    }
}
