//! Teleporting surfaces.

use super::{SurfaceProperty, ValidationContext};
use crate::error::{Result, SceneError};
use crate::hit::RaySceneIntersection;
use crate::scene::Primitive;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// A surface that moves every ray to the point with the same surface
/// parameters on a destination primitive.
///
/// The direction keeps its components in the local frame: tangential
/// along `du` and `dv`, and the normal component along the destination's
/// outward normal. A ray entering the source leaves the destination
/// travelling inwards, so a teleporter between a surface and a rigidly
/// moved copy of it is invisible apart from the move.
#[derive(Debug, Clone, PartialEq)]
pub struct Teleporting {
    /// Name of the destination primitive.
    pub destination: String,
    /// Fraction of light transmitted.
    pub transmission_coefficient: f64,
}

impl Teleporting {
    /// A lossless teleporter to the primitive called `destination`.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            transmission_coefficient: 1.0,
        }
    }

    /// The ray leaving `destination` for an incident ray hitting this
    /// surface, or `None` if the hit parameters fall outside the
    /// destination's domain.
    pub fn teleport(
        &self,
        ray: &Ray,
        hit: &RaySceneIntersection<'_>,
        destination: &Primitive,
        offset: f64,
    ) -> Option<Ray> {
        let q = destination.shape().evaluate(hit.uv)?;
        let src = hit.frame();
        let dst = destination.shape().frame_at(&q);
        let d = ray.direction.as_ref();
        let direction = d.dot(src.du.as_ref()) * dst.du.as_ref()
            + d.dot(src.dv.as_ref()) * dst.dv.as_ref()
            + d.dot(src.normal.as_ref()) * dst.normal.as_ref();
        let direction = optica_math::try_dir(direction)?;
        Some(ray.branch(q, direction, offset))
    }
}

impl SurfaceProperty for Teleporting {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        let Some(destination) = ctx.scene().primitive_by_name(&self.destination) else {
            log::warn!("teleport destination '{}' not in scene", self.destination);
            return Colour::BLACK;
        };
        match self.teleport(ray, hit, destination, ctx.settings().surface_offset) {
            Some(out) => ctx.trace(&out, trace_level) * self.transmission_coefficient,
            None => {
                log::debug!("'{}': uv {:?} outside destination domain", hit.primitive.name(), hit.uv);
                Colour::BLACK
            }
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        let source = ctx.primitive();
        let (node, destination) = ctx.resolve_primitive(&self.destination)?;
        let mismatch = |reason: &str| SceneError::NotOneToOne {
            from: source.name().to_string(),
            to: destination.name().to_string(),
            reason: reason.to_string(),
        };
        if node == ctx.node() {
            return Err(mismatch("a surface cannot teleport to itself"));
        }
        for p in [source, destination] {
            if !p.shape().is_parametrised() {
                return Err(SceneError::NotParametrised(p.name().to_string()));
            }
        }
        if source.shape().domain() != destination.shape().domain() {
            return Err(mismatch("parameter domains differ"));
        }
        ctx.require_unit("transmission coefficient", self.transmission_coefficient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Primitive, SceneBuilder};
    use crate::surface::Emissive;
    use crate::trace::{TraceSettings, Tracer};
    use optica_geom::{Disc, Parallelepiped, Plane, Sphere};
    use optica_math::{Point3, Vec3};
    use std::sync::Arc;

    fn portal(name: &str, center: Point3, to: &str) -> Primitive {
        Primitive::new(name, Disc::new(center, -Vec3::z(), 2.0), Arc::new(Teleporting::new(to)))
    }

    #[test]
    fn test_teleport_to_translated_copy() {
        let red = Arc::new(Emissive::new(Colour::new(1.0, 0.0, 0.0)));
        let scene = SceneBuilder::new("s")
            .add_scene_object(portal("a", Point3::origin(), "b"))
            .add_scene_object(Primitive::new(
                "b",
                Disc::new(Point3::new(100.0, 0.0, 0.0), -Vec3::z(), 2.0),
                Arc::new(Emissive::new(Colour::BLACK)),
            ))
            .add_scene_object(Primitive::new("ball", Sphere::with_center(Point3::new(100.0, 0.0, 5.0), 0.5), red))
            .build()
            .unwrap();
        let tracer = Tracer::new(&scene, TraceSettings::default());

        let trajectory = tracer.trace_trajectory(&Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z()));
        let points = trajectory.hit_points();
        assert_eq!(points.len(), 2);
        assert!((points[1] - Point3::new(100.0, 0.0, 4.5)).norm() < 1e-9);
        assert_eq!(trajectory.colour, Colour::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_teleport_preserves_direction_under_translation() {
        let scene = SceneBuilder::new("s")
            .add_scene_object(portal("a", Point3::origin(), "b"))
            .add_scene_object(portal("b", Point3::new(100.0, 0.0, 0.0), "a"))
            .build()
            .unwrap();
        let a = scene.primitive_by_name("a").unwrap();
        let b = scene.primitive_by_name("b").unwrap();
        let ray = Ray::new(Point3::new(0.3, 0.2, -5.0), Vec3::new(0.1, -0.2, 1.0));
        let hit = a.closest_intersection(&ray).unwrap();
        let out = Teleporting::new("b").teleport(&ray, &hit, b, 1e-6).unwrap();
        assert!((out.origin - (hit.position + Vec3::new(100.0, 0.0, 0.0))).norm() < 1e-9);
        assert!((out.direction.into_inner() - ray.direction.into_inner()).norm() < 1e-12);
    }

    #[test]
    fn test_unknown_destination() {
        let err = SceneBuilder::new("s")
            .add_scene_object(portal("a", Point3::origin(), "nowhere"))
            .build()
            .unwrap_err();
        assert_eq!(err, SceneError::UnknownObject("nowhere".into()));
    }

    #[test]
    fn test_self_teleport_rejected() {
        let err = SceneBuilder::new("s")
            .add_scene_object(portal("a", Point3::origin(), "a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SceneError::NotOneToOne { .. }));
    }

    #[test]
    fn test_mismatched_domains_rejected() {
        let err = SceneBuilder::new("s")
            .add_scene_object(portal("a", Point3::origin(), "ball"))
            .add_scene_object(Primitive::new("ball", Sphere::new(1.0), Arc::new(Emissive::new(Colour::WHITE))))
            .build()
            .unwrap_err();
        assert!(matches!(err, SceneError::NotOneToOne { ref reason, .. } if reason.contains("domain")));
    }

    #[test]
    fn test_unparametrised_destination_rejected() {
        let err = SceneBuilder::new("s")
            .add_scene_object(portal("a", Point3::origin(), "box"))
            .add_scene_object(Primitive::new(
                "box",
                Parallelepiped::cuboid(Point3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 1.0, 1.0)),
                Arc::new(Emissive::new(Colour::WHITE)),
            ))
            .build()
            .unwrap_err();
        assert_eq!(err, SceneError::NotParametrised("box".into()));
    }

    #[test]
    fn test_duplicate_destination_rejected() {
        let white = Arc::new(Emissive::new(Colour::WHITE));
        let err = SceneBuilder::new("s")
            .add_scene_object(portal("a", Point3::origin(), "wall"))
            .add_scene_object(Primitive::new("wall", Plane::xy(), white.clone()))
            .add_scene_object(Primitive::new("wall", Plane::xy(), white))
            .build()
            .unwrap_err();
        assert_eq!(err, SceneError::DuplicateName("wall".into(), 2));
    }
}
