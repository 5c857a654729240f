//! Constructive solid geometry nodes.
//!
//! `Intersection` and `Difference` are evaluated by span algebra: every
//! member's interior spans along the ray are combined, and the first
//! visible boundary in front of the ray origin is the hit. `Union` reports
//! the nearest hit of its children like a [`Container`](super::Container),
//! but also exposes the union of its children's spans so that it can be a
//! member of another CSG node.

use optica_math::{Tolerance, Transform};

use super::object::{nearest_of, SceneObject};
use crate::hit::RaySceneIntersection;
use crate::span::SpanList;
use crate::Ray;

/// A member of an [`Intersection`] or [`Difference`].
#[derive(Debug, Clone)]
pub struct CsgMember {
    /// The member solid.
    pub object: SceneObject,
    /// Whether the member's surface can be hit. An invisible member still
    /// clips the composite but the ray passes through its boundary.
    pub visible: bool,
}

impl CsgMember {
    /// A member whose surface is part of the composite's visible boundary.
    pub fn visible(object: impl Into<SceneObject>) -> Self {
        Self {
            object: object.into(),
            visible: true,
        }
    }

    /// A member that clips without showing its own surface.
    pub fn invisible(object: impl Into<SceneObject>) -> Self {
        Self {
            object: object.into(),
            visible: false,
        }
    }

    fn spans(&self, ray: &Ray, tol: &Tolerance) -> SpanList<'_> {
        let mut spans = self.object.spans(ray, tol);
        if !self.visible {
            spans.hide();
        }
        spans
    }

    fn transform(&self, t: &Transform) -> Self {
        Self {
            object: self.object.transform(t),
            visible: self.visible,
        }
    }
}

fn union_of<'a>(members: &'a [CsgMember], ray: &Ray, tol: &Tolerance) -> SpanList<'a> {
    members
        .iter()
        .fold(SpanList::empty(), |acc, m| acc.union(m.spans(ray, tol), tol))
}

fn minus_negatives<'a>(
    spans: SpanList<'a>,
    negative: &'a [CsgMember],
    ray: &Ray,
    tol: &Tolerance,
) -> SpanList<'a> {
    if spans.is_empty() || negative.is_empty() {
        return spans;
    }
    spans.subtract(&union_of(negative, ray, tol), tol)
}

// =============================================================================
// Union
// =============================================================================

/// Solids that together form one solid.
#[derive(Debug, Clone, Default)]
pub struct Union {
    name: String,
    children: Vec<SceneObject>,
}

impl Union {
    /// An empty union.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append a child.
    pub fn with(mut self, child: impl Into<SceneObject>) -> Self {
        self.children.push(child.into());
        self
    }

    /// The node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[SceneObject] {
        &self.children
    }

    /// Nearest hit among the children; exact ties go to the earlier child.
    pub fn closest_intersection(&self, ray: &Ray, tol: &Tolerance) -> Option<RaySceneIntersection<'_>> {
        nearest_of(&self.children, ray, tol)
    }

    /// Union of the children's spans.
    pub fn spans(&self, ray: &Ray, tol: &Tolerance) -> SpanList<'_> {
        self.children
            .iter()
            .fold(SpanList::empty(), |acc, c| acc.union(c.spans(ray, tol), tol))
    }

    /// A transformed copy; properties are shared.
    pub fn transform(&self, t: &Transform) -> Self {
        Self {
            name: self.name.clone(),
            children: self.children.iter().map(|c| c.transform(t)).collect(),
        }
    }
}

// =============================================================================
// Intersection
// =============================================================================

/// Points inside every positive member and outside every negative member.
#[derive(Debug, Clone, Default)]
pub struct Intersection {
    name: String,
    positive: Vec<CsgMember>,
    negative: Vec<CsgMember>,
}

// =============================================================================
// Difference
// =============================================================================

/// Points inside any positive member and outside every negative member.
#[derive(Debug, Clone, Default)]
pub struct Difference {
    name: String,
    positive: Vec<CsgMember>,
    negative: Vec<CsgMember>,
}

macro_rules! csg_members {
    ($ty:ident) => {
        impl $ty {
            /// A node without members.
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    name: name.into(),
                    positive: Vec::new(),
                    negative: Vec::new(),
                }
            }

            /// Add a visible positive member.
            pub fn with_positive(mut self, object: impl Into<SceneObject>) -> Self {
                self.positive.push(CsgMember::visible(object));
                self
            }

            /// Add a positive member that clips without being seen.
            pub fn with_invisible_positive(mut self, object: impl Into<SceneObject>) -> Self {
                self.positive.push(CsgMember::invisible(object));
                self
            }

            /// Add a visible negative member.
            pub fn with_negative(mut self, object: impl Into<SceneObject>) -> Self {
                self.negative.push(CsgMember::visible(object));
                self
            }

            /// Add a negative member that carves without being seen.
            pub fn with_invisible_negative(mut self, object: impl Into<SceneObject>) -> Self {
                self.negative.push(CsgMember::invisible(object));
                self
            }

            /// The node's name.
            pub fn name(&self) -> &str {
                &self.name
            }

            /// Positive members.
            pub fn positive(&self) -> &[CsgMember] {
                &self.positive
            }

            /// Negative members.
            pub fn negative(&self) -> &[CsgMember] {
                &self.negative
            }

            /// Positive then negative members.
            pub fn members(&self) -> impl Iterator<Item = &CsgMember> {
                self.positive.iter().chain(self.negative.iter())
            }

            /// A transformed copy; properties are shared.
            pub fn transform(&self, t: &Transform) -> Self {
                Self {
                    name: self.name.clone(),
                    positive: self.positive.iter().map(|m| m.transform(t)).collect(),
                    negative: self.negative.iter().map(|m| m.transform(t)).collect(),
                }
            }
        }

        impl From<$ty> for SceneObject {
            fn from(node: $ty) -> Self {
                SceneObject::$ty(node)
            }
        }
    };
}

csg_members!(Intersection);
csg_members!(Difference);

impl Intersection {
    /// AND of the positive spans minus the union of the negative spans.
    pub fn spans(&self, ray: &Ray, tol: &Tolerance) -> SpanList<'_> {
        let mut positive = self.positive.iter();
        let Some(first) = positive.next() else {
            return SpanList::empty();
        };
        let mut acc = first.spans(ray, tol);
        for member in positive {
            if acc.is_empty() {
                break;
            }
            acc = acc.intersect(&member.spans(ray, tol), tol);
        }
        minus_negatives(acc, &self.negative, ray, tol)
    }
}

impl Difference {
    /// Union of the positive spans minus the union of the negative spans.
    pub fn spans(&self, ray: &Ray, tol: &Tolerance) -> SpanList<'_> {
        minus_negatives(union_of(&self.positive, ray, tol), &self.negative, ray, tol)
    }
}

impl From<Union> for SceneObject {
    fn from(u: Union) -> Self {
        SceneObject::Union(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Primitive;
    use crate::surface::Emissive;
    use crate::Colour;
    use optica_geom::{Plane, Sphere};
    use optica_math::{Point3, Vec3};
    use std::sync::Arc;

    const TOL: Tolerance = Tolerance::DEFAULT;

    fn ball(name: &str, z: f64) -> Primitive {
        Primitive::new(
            name,
            Sphere::with_center(Point3::new(0.0, 0.0, z), 1.0),
            Arc::new(Emissive::new(Colour::WHITE)),
        )
    }

    fn along_z() -> Ray {
        Ray::new(Point3::origin(), Vec3::z())
    }

    #[test]
    fn test_union_hits_nearer_sphere() {
        let u = SceneObject::from(Union::new("u").with(ball("a", 5.0)).with(ball("b", 6.0)));
        let hit = u.closest_intersection(&along_z(), &TOL).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-12);
        assert_eq!(hit.primitive.name(), "a");
    }

    #[test]
    fn test_union_spans_merge() {
        let u = Union::new("u").with(ball("a", 5.0)).with(ball("b", 6.0));
        let spans = u.spans(&along_z(), &TOL);
        assert_eq!(spans.spans().len(), 1);
        assert!((spans.spans()[0].exit.t - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_intersection_lens() {
        let lens = SceneObject::from(
            Intersection::new("lens")
                .with_positive(ball("a", 5.0))
                .with_positive(ball("b", 6.0)),
        );
        let hit = lens.closest_intersection(&along_z(), &TOL).unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-12);
        assert_eq!(hit.primitive.name(), "b");
        assert!((hit.normal.as_ref() - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);

        // Through the overlap at z = 5.5 the lens is hit; at z = 4.5 only sphere a is.
        let through = Ray::new(Point3::new(-5.0, 0.0, 5.5), Vec3::x());
        assert!(lens.closest_intersection(&through, &TOL).is_some());
        let outside = Ray::new(Point3::new(-5.0, 0.0, 4.5), Vec3::x());
        assert!(lens.closest_intersection(&outside, &TOL).is_none());
    }

    #[test]
    fn test_difference_cut_surface_normal() {
        let d = SceneObject::from(
            Difference::new("bitten")
                .with_positive(ball("a", 5.0))
                .with_negative(ball("b", 6.0)),
        );
        let hit = d.closest_intersection(&along_z(), &TOL).unwrap();
        assert_eq!(hit.primitive.name(), "a");
        assert!((hit.distance - 4.0).abs() < 1e-12);

        // From inside the removed region looking back, the first surface is
        // the inside of b, facing into the bite.
        let back = Ray::new(Point3::new(0.0, 0.0, 5.5), -Vec3::z());
        let hit = d.closest_intersection(&back, &TOL).unwrap();
        assert_eq!(hit.primitive.name(), "b");
        assert!((hit.distance - 0.5).abs() < 1e-12);
        assert!((hit.normal.as_ref() - Vec3::z()).norm() < 1e-12);
        assert!(hit.is_entering(&back));
    }

    #[test]
    fn test_difference_removes_overlap_region() {
        let d = SceneObject::from(
            Difference::new("bitten")
                .with_positive(ball("a", 5.0))
                .with_negative(ball("b", 6.0)),
        );
        let in_overlap = Ray::new(Point3::new(-5.0, 0.0, 5.5), Vec3::x());
        assert!(d.closest_intersection(&in_overlap, &TOL).is_none());
    }

    #[test]
    fn test_invisible_member_is_passed_through() {
        let below_five = Primitive::new(
            "cut",
            Plane::from_normal(Point3::new(0.0, 0.0, 5.0), Vec3::z()),
            Arc::new(Emissive::new(Colour::BLACK)),
        );
        let hemi = SceneObject::from(
            Intersection::new("hemi")
                .with_positive(ball("a", 5.0))
                .with_invisible_positive(below_five.clone()),
        );
        // Entry through the sphere is unaffected.
        assert!((hemi.closest_intersection(&along_z(), &TOL).unwrap().distance - 4.0).abs() < 1e-12);

        // From inside, the only boundary ahead is the invisible cut plane.
        let inside = Ray::new(Point3::new(0.0, 0.0, 4.5), Vec3::z());
        assert!(hemi.closest_intersection(&inside, &TOL).is_none());

        let capped = SceneObject::from(
            Intersection::new("capped")
                .with_positive(ball("a", 5.0))
                .with_positive(below_five),
        );
        let hit = capped.closest_intersection(&inside, &TOL).unwrap();
        assert_eq!(hit.primitive.name(), "cut");
        assert!((hit.distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_intersection_misses() {
        let empty = SceneObject::from(Intersection::new("none"));
        assert!(empty.closest_intersection(&along_z(), &TOL).is_none());
    }

    #[test]
    fn test_children_order() {
        let d = SceneObject::from(
            Difference::new("d")
                .with_positive(ball("a", 0.0))
                .with_negative(ball("b", 1.0)),
        );
        let names: Vec<&str> = d.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
