//! Scene-graph nodes: primitives, plain containers and the node enum.

use std::sync::Arc;

use optica_geom::Shape;
use optica_math::{Tolerance, Transform};

use super::csg::{Difference, Intersection, Union};
use crate::hit::RaySceneIntersection;
use crate::intersect::{intersect_shape, starts_inside};
use crate::span::{Boundary, SpanList};
use crate::surface::SurfaceProperty;
use crate::Ray;

// =============================================================================
// Primitive
// =============================================================================

/// A shape with a surface property.
///
/// Immutable after construction. The property is shared: transforming a
/// primitive yields a new shape that refers to the same property.
#[derive(Debug, Clone)]
pub struct Primitive {
    name: String,
    shape: Box<dyn Shape>,
    property: Arc<dyn SurfaceProperty>,
}

impl Primitive {
    /// Create a named primitive.
    pub fn new<S: Shape + 'static>(
        name: impl Into<String>,
        shape: S,
        property: Arc<dyn SurfaceProperty>,
    ) -> Self {
        Self::from_boxed(name, Box::new(shape), property)
    }

    /// Create a named primitive from an already boxed shape.
    pub fn from_boxed(
        name: impl Into<String>,
        shape: Box<dyn Shape>,
        property: Arc<dyn SurfaceProperty>,
    ) -> Self {
        Self {
            name: name.into(),
            shape,
            property,
        }
    }

    /// The primitive's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primitive's shape.
    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    /// The surface property.
    pub fn property(&self) -> &dyn SurfaceProperty {
        self.property.as_ref()
    }

    /// A copy with a different surface property.
    pub fn with_property(&self, property: Arc<dyn SurfaceProperty>) -> Self {
        Self {
            name: self.name.clone(),
            shape: self.shape.clone(),
            property,
        }
    }

    /// Nearest forward crossing of the shape.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<RaySceneIntersection<'_>> {
        intersect_shape(ray, self.shape())
            .into_iter()
            .find(|c| ray.accepts(c.t))
            .map(|c| self.hit_at(ray, c.t, false))
    }

    /// Interior spans along the ray's line.
    pub fn spans(&self, ray: &Ray, tol: &Tolerance) -> SpanList<'_> {
        let crossings = intersect_shape(ray, self.shape());
        let inside = starts_inside(ray, self.shape(), &crossings);
        SpanList::from_crossings(self, &crossings, inside, tol)
    }

    /// Intersection record for a point at parameter `t` on this primitive.
    pub(crate) fn hit_at(&self, ray: &Ray, t: f64, flipped: bool) -> RaySceneIntersection<'_> {
        let position = ray.at(t);
        let normal = self.shape.normal_at(&position);
        RaySceneIntersection {
            position,
            normal: if flipped { -normal } else { normal },
            distance: t,
            primitive: self,
            uv: self.shape.uv_at(&position),
        }
    }

    /// A new primitive with the transformed shape and the same property.
    pub fn transform(&self, t: &Transform) -> Self {
        Self {
            name: self.name.clone(),
            shape: self.shape.transform(t),
            property: Arc::clone(&self.property),
        }
    }
}

// =============================================================================
// Container
// =============================================================================

/// An ordered group of scene objects with no boolean semantics.
#[derive(Debug, Clone, Default)]
pub struct Container {
    name: String,
    children: Vec<SceneObject>,
}

impl Container {
    /// An empty container.
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

    /// Append a child in place.
    pub fn add_scene_object(&mut self, child: impl Into<SceneObject>) {
        self.children.push(child.into());
    }

    /// The container's name.
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

    /// A transformed copy; properties are shared.
    pub fn transform(&self, t: &Transform) -> Self {
        Self {
            name: self.name.clone(),
            children: self.children.iter().map(|c| c.transform(t)).collect(),
        }
    }
}

/// Nearest hit over a sequence of objects, first-wins within tolerance.
pub(crate) fn nearest_of<'a>(
    objects: &'a [SceneObject],
    ray: &Ray,
    tol: &Tolerance,
) -> Option<RaySceneIntersection<'a>> {
    let mut best: Option<RaySceneIntersection<'a>> = None;
    for object in objects {
        if let Some(hit) = object.closest_intersection(ray, tol) {
            let closer = match &best {
                None => true,
                Some(b) => hit.distance < b.distance && !tol.distances_equal(hit.distance, b.distance),
            };
            if closer {
                best = Some(hit);
            }
        }
    }
    best
}

// =============================================================================
// Scene object
// =============================================================================

/// A node of the scene graph.
///
/// The graph is a tree: every node owns its children outright.
#[derive(Debug, Clone)]
pub enum SceneObject {
    /// A single shape with a surface property.
    Primitive(Primitive),
    /// Plain grouping.
    Container(Container),
    /// Boolean OR of solids.
    Union(Union),
    /// Boolean AND of positive solids minus negative solids.
    Intersection(Intersection),
    /// Union of positive solids minus negative solids.
    Difference(Difference),
}

impl SceneObject {
    /// The node's name.
    pub fn name(&self) -> &str {
        match self {
            SceneObject::Primitive(p) => p.name(),
            SceneObject::Container(c) => c.name(),
            SceneObject::Union(u) => u.name(),
            SceneObject::Intersection(i) => i.name(),
            SceneObject::Difference(d) => d.name(),
        }
    }

    /// Whether the node bounds a solid interior and may be a CSG member.
    pub fn is_solid(&self) -> bool {
        match self {
            SceneObject::Primitive(p) => p.shape().has_interior(),
            SceneObject::Container(_) => false,
            SceneObject::Union(u) => u.children().iter().all(SceneObject::is_solid),
            SceneObject::Intersection(_) | SceneObject::Difference(_) => true,
        }
    }

    /// Nearest visible hit with `t > ray.min_distance`, or `None`.
    ///
    /// Never fails: degenerate rays and shapes simply miss.
    pub fn closest_intersection(&self, ray: &Ray, tol: &Tolerance) -> Option<RaySceneIntersection<'_>> {
        match self {
            SceneObject::Primitive(p) => p.closest_intersection(ray),
            SceneObject::Container(c) => c.closest_intersection(ray, tol),
            SceneObject::Union(u) => u.closest_intersection(ray, tol),
            SceneObject::Intersection(_) | SceneObject::Difference(_) => {
                self.spans(ray, tol).first_hit(ray).and_then(|b| hit_from_boundary(ray, &b))
            }
        }
    }

    /// Interior spans along the ray's line. Non-solid nodes have none.
    pub fn spans(&self, ray: &Ray, tol: &Tolerance) -> SpanList<'_> {
        match self {
            SceneObject::Primitive(p) if p.shape().has_interior() => p.spans(ray, tol),
            SceneObject::Primitive(_) | SceneObject::Container(_) => SpanList::empty(),
            SceneObject::Union(u) => u.spans(ray, tol),
            SceneObject::Intersection(i) => i.spans(ray, tol),
            SceneObject::Difference(d) => d.spans(ray, tol),
        }
    }

    /// A transformed copy of the subtree. Properties are shared, not copied.
    pub fn transform(&self, t: &Transform) -> SceneObject {
        match self {
            SceneObject::Primitive(p) => SceneObject::Primitive(p.transform(t)),
            SceneObject::Container(c) => SceneObject::Container(c.transform(t)),
            SceneObject::Union(u) => SceneObject::Union(u.transform(t)),
            SceneObject::Intersection(i) => SceneObject::Intersection(i.transform(t)),
            SceneObject::Difference(d) => SceneObject::Difference(d.transform(t)),
        }
    }

    /// Direct children in index order (CSG: positive members, then negative).
    pub fn children(&self) -> Vec<&SceneObject> {
        match self {
            SceneObject::Primitive(_) => Vec::new(),
            SceneObject::Container(c) => c.children().iter().collect(),
            SceneObject::Union(u) => u.children().iter().collect(),
            SceneObject::Intersection(i) => i.members().map(|m| &m.object).collect(),
            SceneObject::Difference(d) => d.members().map(|m| &m.object).collect(),
        }
    }

    /// The `i`-th child in [`SceneObject::children`] order.
    pub fn child(&self, i: usize) -> Option<&SceneObject> {
        self.children().get(i).copied()
    }

    /// The primitive, if this node is one.
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            SceneObject::Primitive(p) => Some(p),
            _ => None,
        }
    }
}

fn hit_from_boundary<'a>(ray: &Ray, b: &Boundary<'a>) -> Option<RaySceneIntersection<'a>> {
    b.primitive.map(|p| p.hit_at(ray, b.t, b.flipped))
}

impl From<Primitive> for SceneObject {
    fn from(p: Primitive) -> Self {
        SceneObject::Primitive(p)
    }
}

impl From<Container> for SceneObject {
    fn from(c: Container) -> Self {
        SceneObject::Container(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Emissive;
    use crate::Colour;
    use optica_geom::{Disc, Plane, Sphere};
    use optica_math::{Point3, Vec3};

    const TOL: Tolerance = Tolerance::DEFAULT;

    fn emissive() -> Arc<dyn SurfaceProperty> {
        Arc::new(Emissive::new(Colour::WHITE))
    }

    fn ball(name: &str, z: f64) -> Primitive {
        Primitive::new(name, Sphere::with_center(Point3::new(0.0, 0.0, z), 1.0), emissive())
    }

    #[test]
    fn test_primitive_sphere_scenario() {
        let p = ball("s", 5.0);
        let ray = Ray::new(Point3::origin(), Vec3::z());
        let hit = p.closest_intersection(&ray).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-12);
        assert!((hit.position - Point3::new(0.0, 0.0, 4.0)).norm() < 1e-12);
        assert!((hit.normal.as_ref() - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_primitive_from_inside_hits_exit() {
        let p = ball("s", 0.0);
        let ray = Ray::new(Point3::origin(), Vec3::x());
        let hit = p.closest_intersection(&ray).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-12);
        assert!(!hit.is_entering(&ray));
    }

    #[test]
    fn test_min_distance_skips_start_surface() {
        let p = Primitive::new("floor", Plane::xy(), emissive());
        let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 1.0, 1.0)).with_min_distance(1e-6);
        assert!(p.closest_intersection(&ray).is_none());
    }

    #[test]
    fn test_container_nearest_and_tie_break() {
        let c = Container::new("root").with(ball("far", 10.0)).with(ball("near", 5.0));
        let ray = Ray::new(Point3::origin(), Vec3::z());
        assert_eq!(c.closest_intersection(&ray, &TOL).unwrap().primitive.name(), "near");

        let tie = Container::new("root").with(ball("first", 5.0)).with(ball("second", 5.0));
        assert_eq!(tie.closest_intersection(&ray, &TOL).unwrap().primitive.name(), "first");
    }

    #[test]
    fn test_container_miss() {
        let c = Container::new("root").with(ball("s", 5.0));
        let ray = Ray::new(Point3::origin(), -Vec3::z());
        assert!(c.closest_intersection(&ray, &TOL).is_none());
    }

    #[test]
    fn test_transform_shares_property() {
        let p = ball("s", 0.0);
        let moved = p.transform(&Transform::translation(1.0, 0.0, 0.0));
        assert!(std::ptr::eq(
            p.property() as *const dyn SurfaceProperty as *const u8,
            moved.property() as *const dyn SurfaceProperty as *const u8
        ));
        // Original untouched.
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
        assert!((p.closest_intersection(&ray).unwrap().position.x).abs() < 1e-12);
    }

    #[test]
    fn test_is_solid() {
        let disc = Primitive::new("d", Disc::new(Point3::origin(), Vec3::z(), 1.0), emissive());
        assert!(!SceneObject::from(disc).is_solid());
        assert!(SceneObject::from(ball("s", 0.0)).is_solid());
        assert!(!SceneObject::from(Container::new("c")).is_solid());
    }
}
