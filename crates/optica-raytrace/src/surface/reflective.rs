//! Mirrors.

use super::{reflect, SurfaceProperty, ValidationContext};
use crate::error::Result;
use crate::hit::RaySceneIntersection;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// A mirror that reflects a fraction of the incident light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflective {
    /// Fraction of light reflected.
    pub reflection_coefficient: f64,
}

impl Reflective {
    /// A mirror with the given reflection coefficient.
    pub fn new(reflection_coefficient: f64) -> Self {
        Self {
            reflection_coefficient,
        }
    }

    /// A lossless mirror.
    pub fn perfect() -> Self {
        Self::new(1.0)
    }
}

impl SurfaceProperty for Reflective {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        let r = reflect(&ray.direction.into_inner(), &hit.normal.into_inner());
        ctx.trace_from(ray, hit, r, trace_level) * self.reflection_coefficient
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        ctx.require_unit("reflection coefficient", self.reflection_coefficient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::scene::{Primitive, SceneBuilder};
    use crate::surface::Emissive;
    use crate::trace::{TraceSettings, Tracer};
    use optica_geom::{Plane, Sphere};
    use optica_math::{Point3, Vec3};
    use std::sync::Arc;

    #[test]
    fn test_mirror_shows_reflected_object() {
        let scene = SceneBuilder::new("s")
            .add_scene_object(Primitive::new("mirror", Plane::xy(), Arc::new(Reflective::new(0.8))))
            .add_scene_object(Primitive::new(
                "lamp",
                Sphere::with_center(Point3::new(2.0, 0.0, 1.0), 0.5),
                Arc::new(Emissive::new(Colour::WHITE)),
            ))
            .build()
            .unwrap();
        let tracer = Tracer::new(&scene, TraceSettings::default());
        // From (0, 0, 1) down at 45 degrees: reflects at (1, 0, 0) towards (2, 0, 1).
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -1.0)));
        assert!((c.r - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient_out_of_range() {
        let err = SceneBuilder::new("s")
            .add_scene_object(Primitive::new("mirror", Plane::xy(), Arc::new(Reflective::new(1.5))))
            .build()
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidParameter { .. }));
    }
}
