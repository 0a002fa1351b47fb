//! 8-bit PNG image sink.

use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageResult, Rgb, RgbImage};

use crate::material::Color;
use crate::renderer::ImageSink;

/// An in-memory image with 8-bit channels that encodes to PNG.
pub struct Png8 {
    img: RgbImage,
}

impl Png8 {
    /// Creates a fresh black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: RgbImage::new(width, height),
        }
    }

    /// Encodes the image as PNG into the writer.
    pub fn write(&self, writer: impl Write) -> ImageResult<()> {
        PngEncoder::new(writer).write_image(
            self.img.as_raw(),
            self.img.width(),
            self.img.height(),
            image::ColorType::Rgb8,
        )
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.img.get_pixel(x, y).0
    }
}

impl ImageSink for Png8 {
    fn width(&self) -> u32 {
        self.img.width()
    }

    fn height(&self) -> u32 {
        self.img.height()
    }

    fn set(&mut self, x: u32, y: u32, color: Color) {
        self.img.put_pixel(
            x,
            y,
            Rgb([to_8bit(color.x), to_8bit(color.y), to_8bit(color.z)]),
        );
    }
}

/// Clamps a linear channel to [0, 1] and quantizes it.
fn to_8bit(channel: f64) -> u8 {
    if channel <= 0.0 {
        0
    } else if channel >= 1.0 {
        255
    } else {
        (channel * 255.0).floor() as u8
    }
}
