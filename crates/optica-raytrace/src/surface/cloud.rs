//! Glowing, partially transparent volumes.

use super::{SurfaceProperty, ValidationContext};
use crate::error::Result;
use crate::hit::RaySceneIntersection;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// The boundary of a uniformly glowing, absorbing medium.
///
/// A ray entering the volume crosses it to the next surface at distance
/// `L`. It picks up `glow * (1 - T)` from the medium and keeps the
/// fraction `T = exp(-density * L)` of whatever lies beyond. Leaving the
/// volume does not change the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowingCloud {
    /// Colour emitted by an optically thick layer.
    pub glow: Colour,
    /// Attenuation per unit length.
    pub density: f64,
}

impl GlowingCloud {
    /// A cloud of the given glow and density.
    pub fn new(glow: Colour, density: f64) -> Self {
        Self { glow, density }
    }

    /// Fraction of light transmitted through a path of `length`.
    pub fn transmittance(&self, length: f64) -> f64 {
        (-self.density * length).exp()
    }
}

impl SurfaceProperty for GlowingCloud {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        let direction = ray.direction.into_inner();
        if !hit.is_entering(ray) {
            return ctx.trace_from(ray, hit, direction, trace_level);
        }
        let Some(inner) = ctx.secondary_ray(ray, hit, direction) else {
            return Colour::BLACK;
        };
        let depth = match ctx.scene().closest_intersection(&inner) {
            Some(next) => next.distance,
            None => f64::INFINITY,
        };
        let t = self.transmittance(depth);
        let mut c = self.glow * (1.0 - t);
        if t > 0.0 {
            c += ctx.trace(&inner, trace_level) * t;
        }
        c
    }

    fn casts_shadow(&self) -> bool {
        false
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(ctx.invalid(format!("density must be non-negative, got {}", self.density)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::scene::{Primitive, Scene, SceneBuilder};
    use crate::trace::{TraceSettings, Tracer};
    use optica_geom::Sphere;
    use optica_math::{Point3, Vec3};
    use std::sync::Arc;

    fn cloud_scene(density: f64, background: Colour) -> Scene {
        SceneBuilder::new("s")
            .add_scene_object(Primitive::new(
                "cloud",
                Sphere::new(1.0),
                Arc::new(GlowingCloud::new(Colour::WHITE, density)),
            ))
            .background(background)
            .build()
            .unwrap()
    }

    #[test]
    fn test_glow_through_unit_sphere() {
        let sigma = 0.7;
        let scene = cloud_scene(sigma, Colour::BLACK);
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z()));
        let expected = 1.0 - (-2.0 * sigma).exp();
        assert!((c.r - expected).abs() < 1e-12);
        assert!((c.b - expected).abs() < 1e-12);
    }

    #[test]
    fn test_background_attenuated() {
        let sigma = 0.5;
        let scene = cloud_scene(sigma, Colour::grey(0.4));
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z()));
        let t = (-2.0 * sigma).exp();
        assert!((c.g - ((1.0 - t) + 0.4 * t)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_density_is_invisible() {
        let scene = cloud_scene(0.0, Colour::grey(0.4));
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z()));
        assert!((c.r - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_negative_density_rejected() {
        let err = SceneBuilder::new("s")
            .add_scene_object(Primitive::new(
                "cloud",
                Sphere::new(1.0),
                Arc::new(GlowingCloud::new(Colour::WHITE, -1.0)),
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidParameter { .. }));
    }
}
