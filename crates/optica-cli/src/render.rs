//! Tracing a full image.

use image::{Rgb, RgbImage};
use optica_raytrace::Tracer;

use crate::camera::PinholeCamera;

/// Trace one ray per pixel in parallel and quantise to 8-bit RGB.
pub fn render_image(tracer: &Tracer<'_>, camera: &PinholeCamera, width: u32, height: u32) -> RgbImage {
    let colours = tracer.trace_all(&camera.rays());
    let mut image = RgbImage::new(width, height);
    for (pixel, colour) in image.pixels_mut().zip(colours) {
        *pixel = Rgb(colour.to_rgb8());
    }
    image
}
