//! Ray-rotating and generalised (complex-map) metarefractive windows.
//!
//! Both rewrite only the component of the ray direction that is
//! tangential to the surface and then continue the ray through the
//! surface. The normal component is recomputed so that the direction
//! stays a unit vector; if the new tangential part is too long for that,
//! the wave would be evanescent and the ray is reflected instead.

use nalgebra::Complex;
use optica_math::Vec3;

use super::{reflect, SurfaceProperty, ValidationContext};
use crate::error::Result;
use crate::hit::RaySceneIntersection;
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// Rotate the component of `d` perpendicular to unit `n` by `angle` about
/// `n`, leaving the normal component unchanged.
pub fn rotate_transverse(d: &Vec3, n: &Vec3, angle: f64) -> Vec3 {
    let dn = d.dot(n);
    let dt = d - dn * n;
    let (sin, cos) = angle.sin_cos();
    dt * cos + n.cross(&dt) * sin + dn * n
}

/// A window that rotates the transverse ray direction by a fixed angle
/// about the local surface normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayRotating {
    /// Rotation angle in radians, right-handed about the outward normal.
    pub angle: f64,
    /// Fraction of light transmitted.
    pub transmission_coefficient: f64,
}

impl RayRotating {
    /// A lossless ray-rotation window.
    pub fn new(angle: f64) -> Self {
        Self {
            angle,
            transmission_coefficient: 1.0,
        }
    }
}

impl SurfaceProperty for RayRotating {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        let d = rotate_transverse(&ray.direction.into_inner(), &hit.normal.into_inner(), self.angle);
        ctx.trace_from(ray, hit, d, trace_level) * self.transmission_coefficient
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        ctx.require_finite("rotation angle", self.angle)?;
        ctx.require_unit("transmission coefficient", self.transmission_coefficient)
    }
}

/// Map applied to the transverse direction written as `u + iv` in the
/// local surface frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComplexMap {
    /// `z -> c z`: rotation by `arg c` combined with scaling by `|c|`.
    Multiplication(Complex<f64>),
    /// `z -> z^p` (principal branch).
    Exponentiation(f64),
}

impl ComplexMap {
    /// Apply the map.
    pub fn apply(&self, z: Complex<f64>) -> Complex<f64> {
        match *self {
            ComplexMap::Multiplication(c) => c * z,
            ComplexMap::Exponentiation(p) => {
                if z.norm_sqr() == 0.0 {
                    Complex::new(0.0, 0.0)
                } else {
                    z.powf(p)
                }
            }
        }
    }
}

/// A metarefractive window whose transverse direction law is a complex map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metarefractive {
    /// Transverse direction law.
    pub map: ComplexMap,
    /// Fraction of light transmitted.
    pub transmission_coefficient: f64,
}

impl Metarefractive {
    /// A lossless window applying `map`.
    pub fn new(map: ComplexMap) -> Self {
        Self {
            map,
            transmission_coefficient: 1.0,
        }
    }

    /// Outgoing direction for unit `d` in a frame with tangents `du`, `dv`
    /// and unit normal `n`.
    pub fn outgoing(&self, d: &Vec3, du: &Vec3, dv: &Vec3, n: &Vec3) -> Vec3 {
        let dn = d.dot(n);
        let z = self.map.apply(Complex::new(d.dot(du), d.dot(dv)));
        let t2 = z.norm_sqr();
        if !(t2 < 1.0) {
            return reflect(d, n);
        }
        z.re * du + z.im * dv + dn.signum() * (1.0 - t2).sqrt() * n
    }
}

impl SurfaceProperty for Metarefractive {
    fn colour(&self, ray: &Ray, hit: &RaySceneIntersection<'_>, ctx: &TraceContext<'_>, trace_level: u32) -> Colour {
        let frame = hit.frame();
        let d = self.outgoing(
            &ray.direction.into_inner(),
            &frame.du.into_inner(),
            &frame.dv.into_inner(),
            &frame.normal.into_inner(),
        );
        ctx.trace_from(ray, hit, d, trace_level) * self.transmission_coefficient
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        match self.map {
            ComplexMap::Multiplication(c) => {
                ctx.require_finite("multiplier (real part)", c.re)?;
                ctx.require_finite("multiplier (imaginary part)", c.im)?;
            }
            ComplexMap::Exponentiation(p) => ctx.require_positive("exponent", p)?,
        }
        ctx.require_unit("transmission coefficient", self.transmission_coefficient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const N: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[test]
    fn test_rotate_transverse_half_turn() {
        let d = Vec3::new(1.0, 0.0, 1.0).normalize();
        let out = rotate_transverse(&d, &N, PI);
        assert!((out - Vec3::new(-1.0, 0.0, 1.0).normalize()).norm() < 1e-12);
    }

    #[test]
    fn test_rotate_transverse_keeps_normal_component() {
        let d = Vec3::new(0.3, -0.4, -0.866).normalize();
        let out = rotate_transverse(&d, &N, 1.0);
        assert!((out.z - d.z).abs() < 1e-12);
        assert!((out.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_multiplication_by_phase_matches_rotation() {
        let angle = 0.7;
        let m = Metarefractive::new(ComplexMap::Multiplication(Complex::from_polar(1.0, angle)));
        let d = Vec3::new(0.2, 0.5, 0.8).normalize();
        let (du, dv) = (Vec3::x(), Vec3::y());
        let out = m.outgoing(&d, &du, &dv, &N);
        assert!((out - rotate_transverse(&d, &N, angle)).norm() < 1e-12);
    }

    #[test]
    fn test_evanescent_reflects() {
        let m = Metarefractive::new(ComplexMap::Multiplication(Complex::new(3.0, 0.0)));
        let d = Vec3::new(0.5, 0.0, -0.75f64.sqrt());
        let out = m.outgoing(&d, &Vec3::x(), &Vec3::y(), &N);
        assert!((out - reflect(&d, &N)).norm() < 1e-12);
    }

    #[test]
    fn test_exponentiation() {
        let map = ComplexMap::Exponentiation(2.0);
        let z = map.apply(Complex::from_polar(0.5, FRAC_PI_2 / 2.0));
        assert!((z.norm() - 0.25).abs() < 1e-12);
        assert!((z.arg() - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(map.apply(Complex::new(0.0, 0.0)), Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_scaling_keeps_unit_length_and_side() {
        let m = Metarefractive::new(ComplexMap::Multiplication(Complex::new(0.5, 0.0)));
        let d = Vec3::new(0.6, 0.0, -0.8);
        let out = m.outgoing(&d, &Vec3::x(), &Vec3::y(), &N);
        assert!((out.norm() - 1.0).abs() < 1e-12);
        assert!((out.x - 0.3).abs() < 1e-12);
        assert!(out.z < 0.0);
    }
}
