//! Ray-disc intersection.

use optica_geom::Disc;

use super::Crossing;
use crate::Ray;

/// Intersect a ray's line with a flat disc.
pub fn intersect_disc(ray: &Ray, disc: &Disc) -> Vec<Crossing> {
    let n = disc.normal.as_ref();
    let denom = n.dot(ray.direction.as_ref());
    if denom.abs() < 1e-15 {
        return Vec::new();
    }

    let t = (disc.center - ray.origin).dot(n) / denom;
    if !disc.within_rim(&ray.at(t)) {
        return Vec::new();
    }
    vec![Crossing {
        t,
        entering: denom < 0.0,
    }]
}
