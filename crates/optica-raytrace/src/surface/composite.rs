//! Properties built from other properties.

use std::sync::Arc;

use super::{SurfaceProperty, ValidationContext};
use crate::error::Result;
use crate::hit::RaySceneIntersection;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// A checkerboard of two properties in surface-parameter space.
#[derive(Debug, Clone)]
pub struct Tiling {
    /// Property of tiles whose index sum is even.
    pub first: Arc<dyn SurfaceProperty>,
    /// Property of the other tiles.
    pub second: Arc<dyn SurfaceProperty>,
    /// Tile period along `u`.
    pub period_u: f64,
    /// Tile period along `v`.
    pub period_v: f64,
}

impl Tiling {
    /// Alternate `first` and `second` with the given periods.
    pub fn new(
        first: Arc<dyn SurfaceProperty>,
        second: Arc<dyn SurfaceProperty>,
        period_u: f64,
        period_v: f64,
    ) -> Self {
        Self {
            first,
            second,
            period_u,
            period_v,
        }
    }

    fn pick(&self, hit: &RaySceneIntersection<'_>) -> &dyn SurfaceProperty {
        let i = (hit.uv.x / self.period_u).floor() as i64;
        let j = (hit.uv.y / self.period_v).floor() as i64;
        if (i + j).rem_euclid(2) == 0 {
            self.first.as_ref()
        } else {
            self.second.as_ref()
        }
    }
}

impl SurfaceProperty for Tiling {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        self.pick(hit).colour(ray, hit, ctx, trace_level)
    }

    fn casts_shadow(&self) -> bool {
        self.first.casts_shadow() || self.second.casts_shadow()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        ctx.require_positive("tile period u", self.period_u)?;
        ctx.require_positive("tile period v", self.period_v)?;
        self.first.validate(ctx)?;
        self.second.validate(ctx)
    }
}

/// A weighted sum of two properties.
#[derive(Debug, Clone)]
pub struct WeightedAverage {
    /// Property weighted by `weight`.
    pub first: Arc<dyn SurfaceProperty>,
    /// Property weighted by `1 - weight`.
    pub second: Arc<dyn SurfaceProperty>,
    /// Weight of `first`, in `[0, 1]`.
    pub weight: f64,
}

impl WeightedAverage {
    /// Mix `first` and `second`.
    pub fn new(first: Arc<dyn SurfaceProperty>, second: Arc<dyn SurfaceProperty>, weight: f64) -> Self {
        Self { first, second, weight }
    }
}

impl SurfaceProperty for WeightedAverage {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        let mut c = Colour::BLACK;
        if self.weight > 0.0 {
            c += self.first.colour(ray, hit, ctx, trace_level) * self.weight;
        }
        if self.weight < 1.0 {
            c += self.second.colour(ray, hit, ctx, trace_level) * (1.0 - self.weight);
        }
        c
    }

    fn casts_shadow(&self) -> bool {
        self.first.casts_shadow() || self.second.casts_shadow()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        ctx.require_unit("weight", self.weight)?;
        self.first.validate(ctx)?;
        self.second.validate(ctx)
    }
}

/// One property inside a rectangle of surface parameters, another outside.
#[derive(Debug, Clone)]
pub struct EitherOr {
    /// Property for hits with `uv` inside the ranges.
    pub inside: Arc<dyn SurfaceProperty>,
    /// Property everywhere else.
    pub outside: Arc<dyn SurfaceProperty>,
    /// Closed `u` range.
    pub u_range: (f64, f64),
    /// Closed `v` range.
    pub v_range: (f64, f64),
}

impl EitherOr {
    /// Use `inside` on `u_range × v_range` and `outside` elsewhere.
    pub fn new(
        inside: Arc<dyn SurfaceProperty>,
        outside: Arc<dyn SurfaceProperty>,
        u_range: (f64, f64),
        v_range: (f64, f64),
    ) -> Self {
        Self {
            inside,
            outside,
            u_range,
            v_range,
        }
    }

    fn contains(&self, u: f64, v: f64) -> bool {
        (self.u_range.0..=self.u_range.1).contains(&u) && (self.v_range.0..=self.v_range.1).contains(&v)
    }
}

impl SurfaceProperty for EitherOr {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        if self.contains(hit.uv.x, hit.uv.y) {
            self.inside.colour(ray, hit, ctx, trace_level)
        } else {
            self.outside.colour(ray, hit, ctx, trace_level)
        }
    }

    fn casts_shadow(&self) -> bool {
        self.inside.casts_shadow() || self.outside.casts_shadow()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        if !(self.u_range.0 <= self.u_range.1 && self.v_range.0 <= self.v_range.1) {
            return Err(ctx.invalid("empty parameter range"));
        }
        self.inside.validate(ctx)?;
        self.outside.validate(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::scene::{Primitive, Scene, SceneBuilder};
    use crate::surface::{Emissive, Reflective, Transparent};
    use crate::trace::{TraceSettings, Tracer};
    use optica_geom::Plane;
    use optica_math::{Point3, Vec3};

    const RED: Colour = Colour::new(1.0, 0.0, 0.0);
    const BLUE: Colour = Colour::new(0.0, 0.0, 1.0);

    fn floor(property: impl SurfaceProperty + 'static) -> Scene {
        SceneBuilder::new("s")
            .add_scene_object(Primitive::new("floor", Plane::xy(), Arc::new(property)))
            .build()
            .unwrap()
    }

    fn look_down_at(scene: &Scene, x: f64, y: f64) -> Colour {
        Tracer::new(scene, TraceSettings::default()).trace(&Ray::new(Point3::new(x, y, 1.0), -Vec3::z()))
    }

    #[test]
    fn test_tiling_alternates() {
        let scene = floor(Tiling::new(
            Arc::new(Emissive::new(RED)),
            Arc::new(Emissive::new(BLUE)),
            1.0,
            1.0,
        ));
        assert_eq!(look_down_at(&scene, 0.5, 0.5), RED);
        assert_eq!(look_down_at(&scene, 1.5, 0.5), BLUE);
        assert_eq!(look_down_at(&scene, -0.5, 0.5), BLUE);
        assert_eq!(look_down_at(&scene, -0.5, -0.5), RED);
    }

    #[test]
    fn test_weighted_average() {
        let scene = floor(WeightedAverage::new(
            Arc::new(Emissive::new(RED)),
            Arc::new(Emissive::new(BLUE)),
            0.25,
        ));
        let c = look_down_at(&scene, 0.0, 0.0);
        assert!((c.r - 0.25).abs() < 1e-12);
        assert!((c.b - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_either_or() {
        let scene = floor(EitherOr::new(
            Arc::new(Emissive::new(RED)),
            Arc::new(Emissive::new(BLUE)),
            (-1.0, 1.0),
            (-1.0, 1.0),
        ));
        assert_eq!(look_down_at(&scene, 0.0, 0.9), RED);
        assert_eq!(look_down_at(&scene, 0.0, 1.1), BLUE);
    }

    #[test]
    fn test_shadow_casting_follows_parts() {
        let clear = Arc::new(Transparent::new(Colour::WHITE));
        let opaque = Arc::new(Emissive::new(RED));
        assert!(!WeightedAverage::new(clear.clone(), clear.clone(), 0.5).casts_shadow());
        assert!(Tiling::new(clear, opaque, 1.0, 1.0).casts_shadow());
    }

    #[test]
    fn test_nested_validation() {
        let err = SceneBuilder::new("s")
            .add_scene_object(Primitive::new(
                "floor",
                Plane::xy(),
                Arc::new(WeightedAverage::new(
                    Arc::new(Reflective::new(2.0)),
                    Arc::new(Emissive::new(RED)),
                    0.5,
                )),
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidParameter { .. }));
    }
}
