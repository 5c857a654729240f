//! Ray-triangle intersection (Möller-Trumbore).

use optica_geom::Triangle;

use super::Crossing;
use crate::Ray;

/// Intersect a ray's line with a triangle.
pub fn intersect_triangle(ray: &Ray, tri: &Triangle) -> Vec<Crossing> {
    let (e1, e2) = tri.edges();
    let d = ray.direction.as_ref();
    let h = d.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < 1e-15 {
        return Vec::new();
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - tri.vertices[0];
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return Vec::new();
    }
    let q = s.cross(&e1);
    let v = inv_det * d.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return Vec::new();
    }

    let t = inv_det * e2.dot(&q);
    // det = (e1 × e2) · -d, so a positive det means travelling against the normal.
    vec![Crossing {
        t,
        entering: det > 0.0,
    }]
}
