//! Ray-scene intersection record.

use optica_geom::SurfaceFrame;
use optica_math::{Dir3, Point2, Point3};

use crate::scene::Primitive;
use crate::Ray;

/// The nearest point where a ray meets the scene.
///
/// A miss is represented by `Option::None` wherever a hit is returned.
#[derive(Debug, Clone, Copy)]
pub struct RaySceneIntersection<'a> {
    /// Hit position in world coordinates.
    pub position: Point3,
    /// Outward normal of the (possibly composite) solid at the hit.
    pub normal: Dir3,
    /// Distance from the ray origin.
    pub distance: f64,
    /// The primitive whose surface was hit.
    pub primitive: &'a Primitive,
    /// Surface parameters of the hit on the primitive.
    pub uv: Point2,
}

impl<'a> RaySceneIntersection<'a> {
    /// Whether the ray travels against the outward normal (into the solid).
    pub fn is_entering(&self, ray: &Ray) -> bool {
        ray.direction.dot(self.normal.as_ref()) < 0.0
    }

    /// Orthonormal tangent frame at the hit, oriented so that its normal is
    /// [`RaySceneIntersection::normal`].
    pub fn frame(&self) -> SurfaceFrame {
        let frame = self.primitive.shape().frame_at(&self.position);
        if frame.normal.dot(self.normal.as_ref()) < 0.0 {
            SurfaceFrame {
                du: frame.du,
                dv: -frame.dv,
                normal: -frame.normal,
            }
        } else {
            frame
        }
    }
}
