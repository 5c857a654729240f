//! Ray intersection with an affinely transformed shape.

use optica_geom::TransformedShape;

use super::{intersect_shape, Crossing};
use crate::Ray;

/// Intersect a ray's line with a transformed shape.
///
/// The ray is carried into the shape's local frame, where the direction is
/// renormalised; local parameters are divided by the local direction length
/// to recover world parameters. A singular transform yields no crossings.
pub fn intersect_transformed(ray: &Ray, shape: &TransformedShape) -> Vec<Crossing> {
    let Some(to_local) = &shape.to_local else {
        return Vec::new();
    };
    let local_dir = to_local.apply_vec(ray.direction.as_ref());
    let scale = local_dir.norm();
    let Some(local_ray) = Ray::try_new(to_local.apply_point(&ray.origin), local_dir) else {
        return Vec::new();
    };

    intersect_shape(&local_ray, shape.local.as_ref())
        .into_iter()
        .map(|c| Crossing {
            t: c.t / scale,
            ..c
        })
        .collect()
}
