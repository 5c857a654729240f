//! Pinhole camera generating one primary ray per pixel.

use anyhow::{bail, Result};
use optica_math::{try_dir, Dir3, Point3, Vec3};
use optica_raytrace::Ray;
use serde::{Deserialize, Serialize};

/// Camera placement as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Eye position.
    pub position: [f64; 3],
    /// Point the camera looks at.
    pub look_at: [f64; 3],
    /// Approximate up direction.
    #[serde(default = "default_up")]
    pub up: [f64; 3],
    /// Horizontal field of view in degrees.
    #[serde(default = "default_fov")]
    pub field_of_view: f64,
}

fn default_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f64 {
    60.0
}

impl CameraConfig {
    /// A camera at `position` looking at `look_at` with `+y` up.
    pub fn looking_at(position: [f64; 3], look_at: [f64; 3]) -> Self {
        Self {
            position,
            look_at,
            up: default_up(),
            field_of_view: default_fov(),
        }
    }
}

/// Pinhole camera with an image plane at unit distance.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    position: Point3,
    forward: Dir3,
    right: Vec3,
    up: Vec3,
    width: u32,
    height: u32,
}

impl PinholeCamera {
    /// Build a camera for an image of `width × height` pixels.
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("image size must be non-zero, got {width}x{height}");
        }
        if !(config.field_of_view > 0.0 && config.field_of_view < 180.0) {
            bail!("field of view must be in (0, 180) degrees, got {}", config.field_of_view);
        }
        let position = Point3::from(config.position);
        let Some(forward) = try_dir(Point3::from(config.look_at) - position) else {
            bail!("camera look_at coincides with its position");
        };
        let Some(right) = try_dir(forward.cross(&Vec3::from(config.up))) else {
            bail!("camera up direction is parallel to the viewing direction");
        };
        let half_width = (config.field_of_view.to_radians() / 2.0).tan();
        let half_height = half_width * height as f64 / width as f64;
        let up = right.cross(forward.as_ref());
        Ok(Self {
            position,
            forward,
            right: right.into_inner() * half_width,
            up: up * half_height,
            width,
            height,
        })
    }

    /// Ray through the centre of pixel `(x, y)`; row 0 is the top.
    pub fn ray(&self, x: u32, y: u32) -> Ray {
        let sx = 2.0 * (x as f64 + 0.5) / self.width as f64 - 1.0;
        let sy = 1.0 - 2.0 * (y as f64 + 0.5) / self.height as f64;
        Ray::new(self.position, self.forward.into_inner() + sx * self.right + sy * self.up)
    }

    /// All primary rays in row-major order.
    pub fn rays(&self) -> Vec<Ray> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| self.ray(x, y)))
            .collect()
    }
}
