//! The parallel render loop: converts a 3D scene into a 2D image.

use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::integrator::sample_scene;
use crate::material::{gen_f64, Color};
use crate::scene::Scene;

/// Options related to the cost and quality of a render.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Maximum recursive ray depth.
    pub bounce_depth: u32,
    /// Sub-pixel samples averaged into each pixel.
    pub samples_per_ray: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            bounce_depth: 5,
            samples_per_ray: 100,
        }
    }
}

/// A 2D canvas receiving one color per pixel.
///
/// `set` is called exactly once per pixel, always from the thread that
/// called [`render`], so implementations need no synchronization.
pub trait ImageSink {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set(&mut self, x: u32, y: u32, color: Color);
}

/// Renders the scene into the image sink.
///
/// Work is split across worker threads by row stripe: worker `i` owns
/// every row congruent to `i` modulo the worker count, with its own
/// independently seeded generator. Finished pixels travel through a
/// channel back to this thread, which is the only one touching the
/// sink; the function returns once every pixel has arrived.
pub fn render(
    scene: &dyn Scene,
    camera: &dyn Camera,
    image: &mut dyn ImageSink,
    settings: &RenderSettings,
) {
    let width = image.width();
    let height = image.height();
    if width == 0 || height == 0 {
        return;
    }

    // Squeeze the viewport so the shorter image edge spans less of the
    // field of view and pixels stay square.
    let aspect_ratio = f64::from(width) / f64::from(height);
    let (x_ratio, y_ratio) = if aspect_ratio < 1.0 {
        (aspect_ratio, 1.0)
    } else {
        (1.0, 1.0 / aspect_ratio)
    };

    let x_span = f64::from(width.saturating_sub(1).max(1));
    let y_span = f64::from(height.saturating_sub(1).max(1));

    let workers = thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);

    info!(
        "rendering {}x{} across {} workers ({} samples, {} bounces)",
        width, height, workers, settings.samples_per_ray, settings.bounce_depth
    );

    let (pixel_sender, pixel_receiver) = mpsc::channel::<(u32, u32, Color)>();

    thread::scope(|scope| {
        for worker in 0..workers {
            let sender = pixel_sender.clone();
            scope.spawn(move || {
                let mut rng = StdRng::from_entropy();
                debug!(
                    "worker {} takes rows {}, {}, ... below {}",
                    worker, worker, worker + workers, height
                );

                let mut rows = 0u32;
                let mut y_pixel = worker as u32;
                while y_pixel < height {
                    rows += 1;
                    let y = y_ratio * (f64::from(y_pixel) / y_span - 0.5) * -1.0; // Positive is up
                    for x_pixel in 0..width {
                        let x = x_ratio * (f64::from(x_pixel) / x_span - 0.5); // Positive is right

                        let mut total = Color::ZERO;
                        for _ in 0..settings.samples_per_ray {
                            // Jitter within the pixel's own footprint.
                            let x_jitter = (gen_f64(&mut rng) - 0.5) * (x_ratio / x_span);
                            let y_jitter = (gen_f64(&mut rng) - 0.5) * (y_ratio / y_span);

                            let ray = camera.cast(&mut rng, x + x_jitter, y + y_jitter);
                            total += sample_scene(&mut rng, scene, ray, settings.bounce_depth);
                        }
                        let color = total / f64::from(settings.samples_per_ray);

                        sender
                            .send((x_pixel, y_pixel, color))
                            .expect("pixel receiver dropped before the render finished");
                    }
                    y_pixel += workers as u32;
                }
                debug!("worker {} finished after {} rows", worker, rows);
            });
        }
        drop(pixel_sender);

        // Every pixel is sent exactly once, so counting them tells us
        // when the workers are done without joining them explicitly.
        let total_pixels = u64::from(width) * u64::from(height);
        for _ in 0..total_pixels {
            let (x, y, color) = pixel_receiver
                .recv()
                .expect("render workers hung up before delivering every pixel");
            image.set(x, y, color);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Perspective;
    use crate::hit::Hit;
    use crate::material::{Material, Surface};
    use helio_math::{DVec3, Ray};

    /// Sink that records what lands where.
    struct TestSink {
        width: u32,
        height: u32,
        pixels: Vec<Option<Color>>,
        writes: u64,
    }

    impl TestSink {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![None; (width * height) as usize],
                writes: 0,
            }
        }
    }

    impl ImageSink for TestSink {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn set(&mut self, x: u32, y: u32, color: Color) {
            let index = (y * self.width + x) as usize;
            assert!(self.pixels[index].is_none(), "pixel ({x}, {y}) set twice");
            self.pixels[index] = Some(color);
            self.writes += 1;
        }
    }

    /// Every ray hits a constant glowing surface.
    struct GlowingEnclosure {
        surface: Surface,
    }

    impl GlowingEnclosure {
        fn new(color: Color) -> Self {
            Self {
                surface: Surface {
                    emissive: color,
                    ..Surface::default()
                },
            }
        }
    }

    impl Scene for GlowingEnclosure {
        fn intersect(&self, ray: &Ray) -> Option<(Hit, &dyn Material)> {
            let position = ray.at(10.0);
            Some((Hit::new(*ray, position, -ray.direction), &self.surface))
        }
    }

    #[test]
    fn test_every_pixel_set_exactly_once() {
        let scene = GlowingEnclosure::new(Color::splat(0.5));
        let camera = Perspective::new();
        let mut sink = TestSink::new(16, 9);

        render(
            &scene,
            &camera,
            &mut sink,
            &RenderSettings {
                bounce_depth: 2,
                samples_per_ray: 1,
            },
        );

        assert_eq!(sink.writes, 16 * 9);
        assert!(sink.pixels.iter().all(|p| p.is_some()));
    }

    #[test]
    fn test_constant_scene_renders_its_color() {
        // A constant emissive enclosure has no Monte Carlo variance:
        // every sample of every pixel sees the same radiance.
        let color = Color::new(0.25, 0.5, 0.75);
        let scene = GlowingEnclosure::new(color);
        let camera = Perspective::new();
        let mut sink = TestSink::new(64, 64);

        render(
            &scene,
            &camera,
            &mut sink,
            &RenderSettings {
                bounce_depth: 5,
                samples_per_ray: 5,
            },
        );

        for pixel in &sink.pixels {
            let value = pixel.expect("all pixels rendered");
            assert!((value - color).length() < 1e-12);
        }
    }

    #[test]
    fn test_single_pixel_image() {
        let scene = GlowingEnclosure::new(Color::ONE);
        let camera = Perspective::new();
        let mut sink = TestSink::new(1, 1);

        render(&scene, &camera, &mut sink, &RenderSettings::default());
        assert_eq!(sink.writes, 1);
    }

    #[test]
    fn test_empty_image_returns_immediately() {
        struct NeverScene;
        impl Scene for NeverScene {
            fn intersect(&self, _ray: &Ray) -> Option<(Hit, &dyn Material)> {
                None
            }
        }

        let camera = Perspective::new();
        let mut sink = TestSink::new(0, 0);
        render(&NeverScene, &camera, &mut sink, &RenderSettings::default());
        assert_eq!(sink.writes, 0);
    }
}
