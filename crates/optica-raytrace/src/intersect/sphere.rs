//! Ray-sphere intersection (quadratic equation).

use optica_geom::Sphere;

use super::Crossing;
use crate::Ray;

/// Intersect a ray's line with a sphere.
///
/// Returns the entry and exit crossings, sorted by t. Tangent lines touch
/// a set of zero measure and count as a miss.
pub fn intersect_sphere(ray: &Ray, sphere: &Sphere) -> Vec<Crossing> {
    let oc = ray.origin - sphere.center;
    let d = ray.direction.as_ref();

    // Quadratic: |oc + t*d|^2 = r^2 with |d| = 1
    let half_b = oc.dot(d);
    let c = oc.dot(&oc) - sphere.radius * sphere.radius;

    let discriminant = half_b * half_b - c;
    if !(discriminant > 0.0) {
        return Vec::new();
    }

    let sqrt_disc = discriminant.sqrt();
    vec![
        Crossing::entry(-half_b - sqrt_disc),
        Crossing::exit(-half_b + sqrt_disc),
    ]
}
