//! Light sources consumed by [`SurfaceColour`].
//!
//! The kernel only needs the [`LightSource`] contract; the two lights here
//! cover ambient fill and a shadow-casting point light.

use optica_math::{try_dir, Point3};

use crate::hit::RaySceneIntersection;
use crate::surface::SurfaceColour;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// A contribution to local shading at a surface point.
pub trait LightSource: Send + Sync + std::fmt::Debug {
    /// Light reflected towards the viewer by `surface` at `hit`.
    ///
    /// Shadow queries go through `ctx.scene()` and start
    /// `ctx.settings().surface_offset` off the surface.
    fn illuminate(
        &self,
        surface: &SurfaceColour,
        ray: &Ray,
        hit: &RaySceneIntersection<'_>,
        ctx: &TraceContext<'_>,
    ) -> Colour;
}

/// Uniform light from every direction.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    /// Light colour.
    pub colour: Colour,
}

impl AmbientLight {
    /// Ambient light of the given colour.
    pub fn new(colour: Colour) -> Self {
        Self { colour }
    }
}

impl LightSource for AmbientLight {
    fn illuminate(
        &self,
        surface: &SurfaceColour,
        _: &Ray,
        _: &RaySceneIntersection<'_>,
        _: &TraceContext<'_>,
    ) -> Colour {
        surface.diffuse * self.colour
    }
}

/// Point light with Lambertian diffuse and Blinn-Phong specular shading.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    /// Light position.
    pub position: Point3,
    /// Light colour.
    pub colour: Colour,
}

impl PointLight {
    /// Point light at `position`.
    pub fn new(position: Point3, colour: Colour) -> Self {
        Self { position, colour }
    }
}

impl LightSource for PointLight {
    fn illuminate(
        &self,
        surface: &SurfaceColour,
        ray: &Ray,
        hit: &RaySceneIntersection<'_>,
        ctx: &TraceContext<'_>,
    ) -> Colour {
        // Shade the side facing the viewer.
        let n = if hit.is_entering(ray) {
            hit.normal.into_inner()
        } else {
            -hit.normal.into_inner()
        };
        let Some(l) = try_dir(self.position - hit.position) else {
            return Colour::BLACK;
        };
        let cos = n.dot(l.as_ref());
        if cos <= 0.0 {
            return Colour::BLACK;
        }
        let offset = ctx.settings().surface_offset;
        if ctx.scene().is_occluded(&hit.position, &self.position, offset) {
            return Colour::BLACK;
        }

        let mut c = surface.diffuse * self.colour * cos;
        if let Some(h) = try_dir(l.into_inner() - ray.direction.into_inner()) {
            let spec = n.dot(h.as_ref()).max(0.0).powf(surface.shininess);
            c += surface.specular * self.colour * spec;
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Primitive, Scene, SceneBuilder};
    use crate::trace::TraceSettings;
    use optica_geom::Plane;
    use optica_math::Vec3;
    use std::sync::Arc;

    fn floor_scene(blocker: bool) -> Scene {
        floor_scene_with_roof(blocker, 5.0, 2.0)
    }

    fn floor_scene_with_roof(blocker: bool, height: f64, radius: f64) -> Scene {
        let matte = Arc::new(SurfaceColour::matte(Colour::WHITE));
        let mut builder =
            SceneBuilder::new("s").add_scene_object(Primitive::new("floor", Plane::xy(), matte.clone()));
        if blocker {
            builder = builder.add_scene_object(Primitive::new(
                "roof",
                optica_geom::Disc::new(Point3::new(0.0, 0.0, height), Vec3::z(), radius),
                matte,
            ));
        }
        builder.build().unwrap()
    }

    fn shade(scene: &Scene, light: &dyn LightSource) -> Colour {
        shade_with(scene, light, &TraceSettings::default())
    }

    fn shade_with(scene: &Scene, light: &dyn LightSource, settings: &TraceSettings) -> Colour {
        let ray = Ray::new(Point3::new(0.0, -1.0, 1.0), Vec3::new(0.0, 1.0, -1.0));
        let hit = scene.closest_intersection(&ray).unwrap();
        let ctx = TraceContext::new(scene, settings);
        light.illuminate(&SurfaceColour::matte(Colour::WHITE), &ray, &hit, &ctx)
    }

    #[test]
    fn test_point_light_overhead() {
        let scene = floor_scene(false);
        let light = PointLight::new(Point3::new(0.0, 0.0, 10.0), Colour::WHITE);
        let c = shade(&scene, &light);
        assert!((c.r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_light_shadowed() {
        let scene = floor_scene(true);
        let light = PointLight::new(Point3::new(0.0, 0.0, 10.0), Colour::WHITE);
        assert_eq!(shade(&scene, &light), Colour::BLACK);
    }

    #[test]
    fn test_shadow_rays_start_at_surface_offset() {
        // A small roof 0.05 above the hit point; the viewing ray passes beside it
        let scene = floor_scene_with_roof(true, 0.05, 0.04);
        let light = PointLight::new(Point3::new(0.0, 0.0, 10.0), Colour::WHITE);
        assert_eq!(shade(&scene, &light), Colour::BLACK);

        let coarse = TraceSettings {
            surface_offset: 0.1,
            ..TraceSettings::default()
        };
        let c = shade_with(&scene, &light, &coarse);
        assert!((c.r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_light_below_surface() {
        let scene = floor_scene(false);
        let light = PointLight::new(Point3::new(0.0, 0.0, -10.0), Colour::WHITE);
        assert_eq!(shade(&scene, &light), Colour::BLACK);
    }

    #[test]
    fn test_ambient() {
        let scene = floor_scene(true);
        let c = shade(&scene, &AmbientLight::new(Colour::grey(0.25)));
        assert!((c.g - 0.25).abs() < 1e-12);
    }
}
