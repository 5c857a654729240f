//! Ray-shape intersection algorithms.
//!
//! Each shape type has a dedicated intersector that returns every point
//! where the ray's infinite line crosses the surface, including those
//! behind the origin. CSG needs the crossings behind the origin to decide
//! whether the origin is inside a solid; callers that only want forward
//! hits filter with [`Ray::accepts`].

mod cylinder;
mod disc;
mod parallelepiped;
mod plane;
mod sphere;
mod transformed;
mod triangle;

pub use cylinder::intersect_cylinder;
pub use disc::intersect_disc;
pub use parallelepiped::intersect_parallelepiped;
pub use plane::intersect_plane;
pub use sphere::intersect_sphere;
pub use transformed::intersect_transformed;
pub use triangle::intersect_triangle;

use optica_geom::{Shape, ShapeKind};

use crate::Ray;

/// A point where a ray's line crosses a shape's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Parameter along the ray.
    pub t: f64,
    /// Whether the line passes from the outside to the inside (for solids)
    /// or against the surface normal (for open surfaces) at this point.
    pub entering: bool,
}

impl Crossing {
    pub(crate) fn entry(t: f64) -> Self {
        Self { t, entering: true }
    }

    pub(crate) fn exit(t: f64) -> Self {
        Self { t, entering: false }
    }
}

/// Entry and exit crossings for a parameter interval, skipping infinite ends.
pub(crate) fn interval_crossings(t_enter: f64, t_exit: f64) -> Vec<Crossing> {
    if !(t_exit > t_enter) {
        return Vec::new();
    }
    let mut crossings = Vec::with_capacity(2);
    if t_enter.is_finite() {
        crossings.push(Crossing::entry(t_enter));
    }
    if t_exit.is_finite() {
        crossings.push(Crossing::exit(t_exit));
    }
    crossings
}

/// Parameter interval in which `lo <= a + t * b <= hi`.
///
/// Returns `(-inf, inf)` or an empty interval when the ray is parallel to
/// the slab.
pub(crate) fn slab(a: f64, b: f64, lo: f64, hi: f64) -> (f64, f64) {
    if b.abs() < 1e-15 {
        if a >= lo && a <= hi {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            (f64::INFINITY, f64::NEG_INFINITY)
        }
    } else {
        let t1 = (lo - a) / b;
        let t2 = (hi - a) / b;
        (t1.min(t2), t1.max(t2))
    }
}

/// Intersect a ray with a shape, returning all crossings sorted by t.
///
/// This dispatches to the appropriate intersector based on shape kind.
/// NaN parameters (from degenerate rays) are discarded.
pub fn intersect_shape(ray: &Ray, shape: &dyn Shape) -> Vec<Crossing> {
    let any = shape.as_any();
    let mut crossings = match shape.shape_kind() {
        ShapeKind::Sphere => any
            .downcast_ref::<optica_geom::Sphere>()
            .map(|s| intersect_sphere(ray, s))
            .unwrap_or_default(),
        ShapeKind::Plane => any
            .downcast_ref::<optica_geom::Plane>()
            .map(|p| intersect_plane(ray, p))
            .unwrap_or_default(),
        ShapeKind::Disc => any
            .downcast_ref::<optica_geom::Disc>()
            .map(|d| intersect_disc(ray, d))
            .unwrap_or_default(),
        ShapeKind::Cylinder => any
            .downcast_ref::<optica_geom::Cylinder>()
            .map(|c| intersect_cylinder(ray, c))
            .unwrap_or_default(),
        ShapeKind::Parallelepiped => any
            .downcast_ref::<optica_geom::Parallelepiped>()
            .map(|p| intersect_parallelepiped(ray, p))
            .unwrap_or_default(),
        ShapeKind::Triangle => any
            .downcast_ref::<optica_geom::Triangle>()
            .map(|t| intersect_triangle(ray, t))
            .unwrap_or_default(),
        ShapeKind::Transformed => any
            .downcast_ref::<optica_geom::TransformedShape>()
            .map(|t| intersect_transformed(ray, t))
            .unwrap_or_default(),
    };
    crossings.retain(|c| !c.t.is_nan());
    crossings.sort_by(|a, b| a.t.total_cmp(&b.t));
    crossings
}

/// Whether the ray origin lies inside the solid bounded by `shape`, judged
/// from its crossings.
///
/// A line whose first crossing is an exit started inside. A line that
/// never crosses the surface is inside everywhere or nowhere, which
/// [`Shape::contains`] decides.
pub fn starts_inside(ray: &Ray, shape: &dyn Shape, crossings: &[Crossing]) -> bool {
    match crossings.first() {
        Some(c) => !c.entering,
        None => shape.contains(&ray.origin),
    }
}
