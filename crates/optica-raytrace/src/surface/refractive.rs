//! Dielectric refraction.

use super::{reflect, refract, SurfaceProperty, ValidationContext};
use crate::error::Result;
use crate::hit::RaySceneIntersection;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// Refraction by Snell's law at the boundary of a solid.
///
/// `index_ratio` is the refractive index inside the solid divided by the
/// index outside. Total internal reflection falls back to the reflected
/// ray. With partial reflection, the refracted and reflected rays are both
/// traced and summed with their coefficients; in Fresnel mode the split
/// between them follows the unpolarised Fresnel reflectance instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refractive {
    /// Inside over outside refractive index.
    pub index_ratio: f64,
    /// Weight of the refracted ray.
    pub transmission_coefficient: f64,
    /// Weight of the reflected ray (ignored in Fresnel mode).
    pub reflection_coefficient: f64,
    /// Split transmitted light by the Fresnel equations.
    pub fresnel: bool,
}

impl Refractive {
    /// Lossless refraction without reflection.
    pub fn new(index_ratio: f64) -> Self {
        Self {
            index_ratio,
            transmission_coefficient: 1.0,
            reflection_coefficient: 0.0,
            fresnel: false,
        }
    }

    /// Trace a reflected ray alongside the refracted one.
    pub fn with_partial_reflection(mut self, transmission_coefficient: f64, reflection_coefficient: f64) -> Self {
        self.transmission_coefficient = transmission_coefficient;
        self.reflection_coefficient = reflection_coefficient;
        self
    }

    /// Weight the refracted and reflected rays by Fresnel reflectance.
    pub fn with_fresnel(mut self) -> Self {
        self.fresnel = true;
        self
    }
}

/// Unpolarised Fresnel reflectance for cosines of the incidence and
/// transmission angles and index ratio `eta` (incident over transmitted).
pub fn fresnel_reflectance(cos_i: f64, cos_t: f64, eta: f64) -> f64 {
    let rs = (eta * cos_i - cos_t) / (eta * cos_i + cos_t);
    let rp = (cos_i - eta * cos_t) / (cos_i + eta * cos_t);
    0.5 * (rs * rs + rp * rp)
}

impl SurfaceProperty for Refractive {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        let d = ray.direction.into_inner();
        let n = hit.normal.into_inner();
        let (facing, eta) = if hit.is_entering(ray) {
            (n, 1.0 / self.index_ratio)
        } else {
            (-n, self.index_ratio)
        };
        let reflected = reflect(&d, &facing);

        let Some(refracted) = refract(&d, &facing, eta) else {
            let weight = (self.transmission_coefficient + self.reflection_coefficient).min(1.0);
            return ctx.trace_from(ray, hit, reflected, trace_level) * weight;
        };

        let (t_weight, r_weight) = if self.fresnel {
            let r = fresnel_reflectance(-d.dot(&facing), -refracted.dot(&facing), eta);
            (self.transmission_coefficient * (1.0 - r), self.transmission_coefficient * r)
        } else {
            (self.transmission_coefficient, self.reflection_coefficient)
        };

        let mut c = Colour::BLACK;
        if t_weight > 0.0 {
            c += ctx.trace_from(ray, hit, refracted, trace_level) * t_weight;
        }
        if r_weight > 0.0 {
            c += ctx.trace_from(ray, hit, reflected, trace_level) * r_weight;
        }
        c
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        ctx.require_positive("refractive index ratio", self.index_ratio)?;
        ctx.require_unit("transmission coefficient", self.transmission_coefficient)?;
        ctx.require_unit("reflection coefficient", self.reflection_coefficient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::scene::{Primitive, Scene, SceneBuilder};
    use crate::surface::Emissive;
    use crate::trace::{TraceSettings, Tracer};
    use optica_geom::Plane;
    use optica_math::{Point3, Vec3};
    use std::sync::Arc;

    const RED: Colour = Colour::new(1.0, 0.0, 0.0);
    const GREEN: Colour = Colour::new(0.0, 1.0, 0.0);

    /// Glass filling z < 0, a red floor below and a green ceiling above.
    fn glass_scene(glass: Refractive) -> Scene {
        SceneBuilder::new("s")
            .add_scene_object(Primitive::new("glass", Plane::xy(), Arc::new(glass)))
            .add_scene_object(Primitive::new(
                "floor",
                Plane::from_normal(Point3::new(0.0, 0.0, -10.0), Vec3::z()),
                Arc::new(Emissive::new(RED)),
            ))
            .add_scene_object(Primitive::new(
                "ceiling",
                Plane::from_normal(Point3::new(0.0, 0.0, 10.0), -Vec3::z()),
                Arc::new(Emissive::new(GREEN)),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_refracts_out_of_glass() {
        let scene = glass_scene(Refractive::new(1.5));
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(0.2, 0.0, 1.0)));
        assert_eq!(c, GREEN);
    }

    #[test]
    fn test_total_internal_reflection() {
        let scene = glass_scene(Refractive::new(1.5));
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let steep = Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(tracer.trace(&steep), RED);

        let trajectory = tracer.trace_trajectory(&steep);
        assert_eq!(trajectory.hit_points().len(), 2);
        assert!((trajectory.hit_points()[1].z + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_reflection_blends() {
        let glass = Refractive::new(1.5).with_partial_reflection(0.75, 0.25);
        let scene = glass_scene(glass);
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(0.2, 0.0, 1.0)));
        assert!((c.g - 0.75).abs() < 1e-12);
        assert!((c.r - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_fresnel_normal_incidence() {
        let r = fresnel_reflectance(1.0, 1.0, 1.0 / 1.5);
        assert!((r - 0.04).abs() < 1e-12);

        let scene = glass_scene(Refractive::new(1.5).with_fresnel());
        let tracer = Tracer::new(&scene, TraceSettings::default());
        let c = tracer.trace(&Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::z()));
        assert!((c.g - 0.96).abs() < 1e-12);
        assert!((c.r - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_bad_index_rejected() {
        let err = SceneBuilder::new("s")
            .add_scene_object(Primitive::new("glass", Plane::xy(), Arc::new(Refractive::new(0.0))))
            .build()
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidParameter { ref object, .. } if object == "glass"));
    }
}
