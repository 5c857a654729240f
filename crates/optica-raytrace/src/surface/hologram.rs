//! Phase holograms: ideal thin lenses and point-to-point imaging.
//!
//! A phase hologram adds the gradient of its phase to the tangential
//! component of the ray direction. The ray keeps travelling to the same
//! side of the surface; if the new tangential component is longer than
//! one, no propagating ray exists and the ray is reflected.

use optica_math::{try_dir, Dir3, Point3, Vec3};

use super::{reflect, SurfaceProperty, ValidationContext};
use crate::error::{Result, SceneError};
use crate::hit::RaySceneIntersection;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// Direction of unit `d` after adding the tangential part of `delta` at a
/// surface with unit normal `n`.
pub fn redirect(d: &Vec3, n: &Vec3, delta: &Vec3) -> Vec3 {
    let dn = d.dot(n);
    let dt = d - dn * n + (delta - delta.dot(n) * n);
    let t2 = dt.norm_squared();
    if !(t2 < 1.0) {
        return reflect(d, n);
    }
    dt + dn.signum() * (1.0 - t2).sqrt() * n
}

/// Trace onwards after shifting the tangential direction by `delta`.
pub fn continue_with_tangential_change(
    ray: &Ray,
    hit: &RaySceneIntersection<'_>,
    delta: &Vec3,
    ctx: &TraceContext<'_>,
    trace_level: u32,
    transmission_coefficient: f64,
) -> Colour {
    let d = redirect(&ray.direction.into_inner(), &hit.normal.into_inner(), delta);
    ctx.trace_from(ray, hit, d, trace_level) * transmission_coefficient
}

// =============================================================================
// Thin lens
// =============================================================================

/// An ideal thin lens.
///
/// Every ray is bent so that, in slope form relative to the optical axis,
/// `s' = s - r / f`, where `r` is the transverse offset of the hit from the
/// principal point. All rays from one object point then meet in one image
/// point, whatever the surface shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinLensHologram {
    /// Principal point.
    pub principal_point: Point3,
    /// Unit optical axis.
    pub optical_axis: Dir3,
    /// Focal length (negative for a diverging lens).
    pub focal_length: f64,
    /// Fraction of light transmitted.
    pub transmission_coefficient: f64,
}

impl ThinLensHologram {
    /// A lossless ideal lens.
    pub fn new(principal_point: Point3, optical_axis: Vec3, focal_length: f64) -> Self {
        Self {
            principal_point,
            optical_axis: Dir3::new_normalize(optical_axis),
            focal_length,
            transmission_coefficient: 1.0,
        }
    }

    /// Outgoing direction of unit `d` through lens point `p`, or `None`
    /// for rays travelling perpendicular to the axis.
    pub fn outgoing(&self, d: &Vec3, p: &Point3) -> Option<Vec3> {
        let axis = self.optical_axis.as_ref();
        let along = d.dot(axis);
        if along.abs() < 1e-12 {
            return None;
        }
        // Axis oriented with the ray.
        let a = axis * along.signum();
        let slope = d / along.abs() - a;
        let offset = p - self.principal_point;
        let r = offset - offset.dot(axis) * axis;
        try_dir(slope - r / self.focal_length + a).map(Dir3::into_inner)
    }
}

impl SurfaceProperty for ThinLensHologram {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        match self.outgoing(&ray.direction.into_inner(), &hit.position) {
            Some(d) => ctx.trace_from(ray, hit, d, trace_level) * self.transmission_coefficient,
            None => Colour::BLACK,
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        ctx.require_finite("focal length", self.focal_length)?;
        if self.focal_length == 0.0 {
            return Err(ctx.invalid("focal length must be non-zero"));
        }
        ctx.require_unit("transmission coefficient", self.transmission_coefficient)
    }
}

// =============================================================================
// Point-to-point imaging
// =============================================================================

/// A transmission hologram that images point `a` stigmatically onto
/// point `b` (and `b` onto `a`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagingHologram {
    /// First conjugate point.
    pub point_a: Point3,
    /// Second conjugate point.
    pub point_b: Point3,
    /// Fraction of light transmitted.
    pub transmission_coefficient: f64,
}

impl ImagingHologram {
    /// A lossless hologram imaging `point_a` to `point_b`.
    pub fn new(point_a: Point3, point_b: Point3) -> Self {
        Self {
            point_a,
            point_b,
            transmission_coefficient: 1.0,
        }
    }

    /// Phase gradient at `p`: turns the direction from `a` into the
    /// direction towards `b`.
    pub fn phase_gradient(&self, p: &Point3) -> Option<Vec3> {
        let from_a = try_dir(p - self.point_a)?;
        let to_b = try_dir(self.point_b - p)?;
        Some(to_b.into_inner() - from_a.into_inner())
    }
}

impl SurfaceProperty for ImagingHologram {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        match self.phase_gradient(&hit.position) {
            Some(delta) => {
                continue_with_tangential_change(ray, hit, &delta, ctx, trace_level, self.transmission_coefficient)
            }
            None => Colour::BLACK,
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        if (self.point_a - self.point_b).norm() < 1e-12 {
            let name = ctx.primitive().name().to_string();
            return Err(SceneError::NotOneToOne {
                from: name.clone(),
                to: name,
                reason: "conjugate points coincide".into(),
            });
        }
        ctx.require_unit("transmission coefficient", self.transmission_coefficient)
    }
}
