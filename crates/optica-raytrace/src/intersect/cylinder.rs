//! Ray-cylinder intersection.
//!
//! The solid cylinder is the intersection of an infinite circular tube
//! with the slab between the two cap planes, so the crossings are the
//! ends of the intersection of two parameter intervals.

use optica_geom::Cylinder;

use super::{interval_crossings, slab, Crossing};
use crate::Ray;

/// Intersect a ray's line with a capped cylinder.
pub fn intersect_cylinder(ray: &Ray, cyl: &Cylinder) -> Vec<Crossing> {
    let axis = cyl.axis.as_ref();
    let d = ray.direction.as_ref();
    let oc = ray.origin - cyl.start;

    // Project onto the plane perpendicular to the axis.
    let d_perp = d - d.dot(axis) * axis;
    let oc_perp = oc - oc.dot(axis) * axis;

    let a = d_perp.dot(&d_perp);
    let half_b = oc_perp.dot(&d_perp);
    let c = oc_perp.dot(&oc_perp) - cyl.radius * cyl.radius;

    let (tube_lo, tube_hi) = if a < 1e-15 {
        // Parallel to the axis: inside the tube everywhere or nowhere.
        if c < 0.0 {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            return Vec::new();
        }
    } else {
        let discriminant = half_b * half_b - a * c;
        if !(discriminant > 0.0) {
            return Vec::new();
        }
        let sqrt_disc = discriminant.sqrt();
        ((-half_b - sqrt_disc) / a, (-half_b + sqrt_disc) / a)
    };

    let (cap_lo, cap_hi) = slab(oc.dot(axis), d.dot(axis), 0.0, cyl.length);
    interval_crossings(tube_lo.max(cap_lo), tube_hi.min(cap_hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use optica_math::{Point3, Vec3};

    fn z_cylinder() -> Cylinder {
        Cylinder::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0), 2.0)
    }

    #[test]
    fn test_ray_cylinder_side() {
        let ray = Ray::new(Point3::new(-5.0, 0.0, 5.0), Vec3::x());
        let hits = intersect_cylinder(&ray, &z_cylinder());
        assert_eq!(hits.len(), 2);
        assert!((hits[0].t - 3.0).abs() < 1e-10);
        assert!((hits[1].t - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_cylinder_along_axis_hits_caps() {
        let ray = Ray::new(Point3::new(0.5, 0.0, -3.0), Vec3::z());
        let hits = intersect_cylinder(&ray, &z_cylinder());
        assert_eq!(hits.len(), 2);
        assert!((hits[0].t - 3.0).abs() < 1e-10);
        assert!((hits[1].t - 13.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_cylinder_enters_cap_leaves_side() {
        let cyl = z_cylinder();
        let ray = Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let hits = intersect_cylinder(&ray, &cyl);
        assert_eq!(hits.len(), 2);
        let entry = ray.at(hits[0].t);
        let exit = ray.at(hits[1].t);
        assert!(entry.z.abs() < 1e-10);
        assert!((exit.x - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_cylinder_misses_beyond_cap() {
        let ray = Ray::new(Point3::new(-5.0, 0.0, 12.0), Vec3::x());
        assert!(intersect_cylinder(&ray, &z_cylinder()).is_empty());
    }

    #[test]
    fn test_ray_cylinder_parallel_outside() {
        let ray = Ray::new(Point3::new(3.0, 0.0, -3.0), Vec3::z());
        assert!(intersect_cylinder(&ray, &z_cylinder()).is_empty());
    }
}
