//! Ray-plane intersection.

use optica_geom::Plane;

use super::Crossing;
use crate::Ray;

/// Intersect a ray's line with a plane.
///
/// The plane bounds the half-space behind its normal, so the crossing is
/// an entry when the ray travels against the normal. Lines parallel to the
/// plane do not cross it.
pub fn intersect_plane(ray: &Ray, plane: &Plane) -> Vec<Crossing> {
    let n = plane.normal_dir.as_ref();
    let denom = n.dot(ray.direction.as_ref());
    if denom.abs() < 1e-15 {
        return Vec::new();
    }

    let t = (plane.origin - ray.origin).dot(n) / denom;
    vec![Crossing {
        t,
        entering: denom < 0.0,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use optica_math::{Point3, Vec3};

    #[test]
    fn test_ray_plane_perpendicular() {
        let plane = Plane::xy();
        let ray = Ray::new(Point3::new(2.0, 3.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let hits = intersect_plane(&ray, &plane);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t - 10.0).abs() < 1e-12);
        assert!(hits[0].entering);
    }

    #[test]
    fn test_ray_plane_oblique() {
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 5.0), Vec3::z());
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.0, 1.0));
        let hits = intersect_plane(&ray, &plane);
        assert!((hits[0].t - 5.0 * 2f64.sqrt()).abs() < 1e-12);
        assert!(!hits[0].entering);
    }

    #[test]
    fn test_ray_plane_parallel() {
        let plane = Plane::xy();
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::x());
        assert!(intersect_plane(&ray, &plane).is_empty());
    }

    #[test]
    fn test_ray_plane_behind() {
        let plane = Plane::xy();
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::z());
        let hits = intersect_plane(&ray, &plane);
        assert!((hits[0].t + 1.0).abs() < 1e-12);
    }
}
