//! Non-recursive and pass-through surfaces.

use super::{SurfaceProperty, ValidationContext};
use crate::error::Result;
use crate::hit::RaySceneIntersection;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// Diffuse and specular colour lit by the scene's light sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceColour {
    /// Diffuse reflectance.
    pub diffuse: Colour,
    /// Specular reflectance.
    pub specular: Colour,
    /// Specular exponent.
    pub shininess: f64,
    /// Whether the surface blocks light.
    pub shadow_casting: bool,
}

impl SurfaceColour {
    /// Purely diffuse surface.
    pub fn matte(diffuse: Colour) -> Self {
        Self {
            diffuse,
            specular: Colour::BLACK,
            shininess: 1.0,
            shadow_casting: true,
        }
    }

    /// Diffuse surface with a specular highlight.
    pub fn shiny(diffuse: Colour, specular: Colour, shininess: f64) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
            shadow_casting: true,
        }
    }
}

impl SurfaceProperty for SurfaceColour {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, _: u32) -> Colour {
        ctx.scene()
            .lights()
            .iter()
            .map(|light| light.illuminate(self, ray, hit, ctx))
            .sum()
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_casting
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        ctx.require_finite("shininess", self.shininess)
    }
}

/// A surface that emits a fixed colour regardless of lighting.
///
/// [`Colour::BLACK`] makes a perfect absorber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emissive {
    /// Emitted colour.
    pub colour: Colour,
}

impl Emissive {
    /// An emitter of the given colour.
    pub fn new(colour: Colour) -> Self {
        Self { colour }
    }
}

impl SurfaceProperty for Emissive {
    fn colour(&self, _: &Ray, _: &RaySceneIntersection<'_>, _: &TraceContext<'_>, _: u32) -> Colour {
        self.colour
    }
}

/// A surface the ray passes straight through, tinted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transparent {
    /// Per-channel transmission.
    pub tint: Colour,
}

impl Transparent {
    /// A see-through surface with the given tint.
    pub fn new(tint: Colour) -> Self {
        Self { tint }
    }
}

impl SurfaceProperty for Transparent {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        ctx.trace_from(ray, hit, ray.direction.into_inner(), trace_level) * self.tint
    }

    fn casts_shadow(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::AmbientLight;
    use crate::scene::{Primitive, SceneBuilder};
    use crate::trace::{TraceSettings, Tracer};
    use optica_geom::{Disc, Plane};
    use optica_math::{Point3, Vec3};
    use std::sync::Arc;

    #[test]
    fn test_surface_colour_sums_lights() {
        let scene = SceneBuilder::new("s")
            .add_scene_object(Primitive::new(
                "floor",
                Plane::xy(),
                Arc::new(SurfaceColour::matte(Colour::new(0.5, 1.0, 0.0))),
            ))
            .add_light(AmbientLight::new(Colour::grey(0.2)))
            .add_light(AmbientLight::new(Colour::grey(0.3)))
            .build()
            .unwrap();
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, 1.0), -Vec3::z()));
        assert!((c.r - 0.25).abs() < 1e-12);
        assert!((c.g - 0.5).abs() < 1e-12);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_transparent_tints_what_lies_behind() {
        let scene = SceneBuilder::new("s")
            .add_scene_object(Primitive::new(
                "filter",
                Disc::new(Point3::origin(), Vec3::z(), 1.0),
                Arc::new(Transparent::new(Colour::new(1.0, 0.5, 0.0))),
            ))
            .add_scene_object(Primitive::new(
                "wall",
                Plane::from_normal(Point3::new(0.0, 0.0, -5.0), Vec3::z()),
                Arc::new(Emissive::new(Colour::WHITE)),
            ))
            .build()
            .unwrap();
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, 1.0), -Vec3::z()));
        assert_eq!(c, Colour::new(1.0, 0.5, 0.0));
        assert!(!Transparent::new(Colour::WHITE).casts_shadow());
    }
}
