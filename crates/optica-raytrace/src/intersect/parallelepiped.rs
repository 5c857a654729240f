//! Ray-parallelepiped intersection (slab method in the edge basis).

use optica_geom::Parallelepiped;

use super::{interval_crossings, slab, Crossing};
use crate::Ray;

/// Intersect a ray's line with a parallelepiped.
///
/// In coordinates relative to the edge vectors the solid is the cube
/// `[-1/2, 1/2]^3`; each coordinate is affine in t, giving three slabs.
pub fn intersect_parallelepiped(ray: &Ray, p: &Parallelepiped) -> Vec<Crossing> {
    let Some(dual) = p.dual_basis() else {
        return Vec::new();
    };
    let oc = ray.origin - p.center;
    let d = ray.direction.as_ref();

    let mut t_lo = f64::NEG_INFINITY;
    let mut t_hi = f64::INFINITY;
    for row in &dual {
        let (lo, hi) = slab(row.dot(&oc), row.dot(d), -0.5, 0.5);
        t_lo = t_lo.max(lo);
        t_hi = t_hi.min(hi);
    }
    interval_crossings(t_lo, t_hi)
}
