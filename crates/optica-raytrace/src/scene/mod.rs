//! Scene graph, CSG and scene construction.
//!
//! A [`Scene`] is built once by a [`SceneBuilder`], validated, and then
//! shared read-only by every trace. Validation is the only place where
//! structural problems are reported; tracing a built scene cannot fail.

mod csg;
mod index;
mod object;

pub use csg::{CsgMember, Difference, Intersection, Union};
pub use index::{NodeId, NodeInfo, SceneIndex};
pub use object::{Container, Primitive, SceneObject};

use optica_math::{Point3, Tolerance};

use crate::error::{Result, SceneError};
use crate::hit::RaySceneIntersection;
use crate::light::LightSource;
use crate::surface::ValidationContext;
use crate::{Colour, Ray};

/// Upper bound on see-through surfaces a shadow ray crosses before the
/// light is considered blocked.
const MAX_SHADOW_PASSES: usize = 64;

/// A validated scene ready for tracing.
#[derive(Debug)]
pub struct Scene {
    root: SceneObject,
    lights: Vec<Box<dyn LightSource>>,
    background: Colour,
    index: SceneIndex,
    tolerance: Tolerance,
}

impl Scene {
    /// Root of the scene graph.
    pub fn root(&self) -> &SceneObject {
        &self.root
    }

    /// Light sources used by shading properties.
    pub fn lights(&self) -> &[Box<dyn LightSource>] {
        &self.lights
    }

    /// Colour returned for rays that leave the scene.
    pub fn background(&self) -> Colour {
        self.background
    }

    /// Arena index of the scene graph.
    pub fn index(&self) -> &SceneIndex {
        &self.index
    }

    /// Distance tolerance used for CSG and tie-breaking.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Nearest hit of `ray` with the scene, or `None` for a miss.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<RaySceneIntersection<'_>> {
        self.root.closest_intersection(ray, &self.tolerance)
    }

    /// Whether something that casts a shadow lies strictly between `from`
    /// and `to`.
    ///
    /// Surfaces that do not cast shadows are stepped through, so a light
    /// behind a window or a glowing cloud still illuminates.
    pub fn is_occluded(&self, from: &Point3, to: &Point3, offset: f64) -> bool {
        let Some(mut ray) = Ray::try_new(*from, to - from) else {
            return false;
        };
        ray.min_distance = offset;
        let mut remaining = (to - from).norm();
        for _ in 0..MAX_SHADOW_PASSES {
            match self.closest_intersection(&ray) {
                Some(hit) if hit.distance < remaining - offset => {
                    if hit.primitive.property().casts_shadow() {
                        return true;
                    }
                    remaining -= hit.distance;
                    ray = ray.branch(hit.position, ray.direction, offset);
                }
                _ => return false,
            }
        }
        false
    }

    /// The unique node called `name`.
    pub fn object_by_name(&self, name: &str) -> Result<&SceneObject> {
        match self.index.find(name) {
            [] => Err(SceneError::UnknownObject(name.to_string())),
            [id] => self
                .index
                .resolve(&self.root, *id)
                .ok_or_else(|| SceneError::UnknownObject(name.to_string())),
            ids => Err(SceneError::DuplicateName(name.to_string(), ids.len())),
        }
    }

    /// The first primitive called `name`, if any.
    pub fn primitive_by_name(&self, name: &str) -> Option<&Primitive> {
        self.index
            .find(name)
            .iter()
            .filter_map(|id| self.index.resolve(&self.root, *id))
            .find_map(SceneObject::as_primitive)
    }
}

/// Builds and validates a [`Scene`].
///
/// ```
/// use std::sync::Arc;
/// use optica_geom::Sphere;
/// use optica_raytrace::{Colour, Primitive, SceneBuilder};
/// use optica_raytrace::surface::Emissive;
///
/// let scene = SceneBuilder::new("demo")
///     .add_scene_object(Primitive::new(
///         "ball",
///         Sphere::new(1.0),
///         Arc::new(Emissive::new(Colour::WHITE)),
///     ))
///     .background(Colour::grey(0.2))
///     .build()
///     .unwrap();
/// assert_eq!(scene.index().len(), 2);
/// ```
#[derive(Debug)]
pub struct SceneBuilder {
    root: Container,
    lights: Vec<Box<dyn LightSource>>,
    background: Colour,
    tolerance: Tolerance,
}

impl SceneBuilder {
    /// A builder for an empty scene whose root container is called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            root: Container::new(name),
            lights: Vec::new(),
            background: Colour::BLACK,
            tolerance: Tolerance::DEFAULT,
        }
    }

    /// Add a top-level scene object.
    pub fn add_scene_object(mut self, object: impl Into<SceneObject>) -> Self {
        self.root.add_scene_object(object);
        self
    }

    /// Add a light source.
    pub fn add_light(mut self, light: impl LightSource + 'static) -> Self {
        self.lights.push(Box::new(light));
        self
    }

    /// Set the background colour.
    pub fn background(mut self, colour: Colour) -> Self {
        self.background = colour;
        self
    }

    /// Set the distance tolerance (defaults to [`Tolerance::DEFAULT`]).
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validate the graph and produce the scene.
    pub fn build(self) -> Result<Scene> {
        let root = SceneObject::Container(self.root);
        let index = SceneIndex::build(&root);
        validate(&root, &index)?;
        log::info!(
            "built scene '{}': {} nodes, {} lights",
            root.name(),
            index.len(),
            self.lights.len()
        );
        Ok(Scene {
            root,
            lights: self.lights,
            background: self.background,
            index,
            tolerance: self.tolerance,
        })
    }
}

fn validate(root: &SceneObject, index: &SceneIndex) -> Result<()> {
    for id in index.ids() {
        let Some(object) = index.resolve(root, id) else {
            continue;
        };
        match object {
            SceneObject::Intersection(i) => validate_csg(i.name(), i.positive(), i.members())?,
            SceneObject::Difference(d) => validate_csg(d.name(), d.positive(), d.members())?,
            SceneObject::Primitive(p) => {
                let ctx = ValidationContext::new(root, index, p, id);
                p.property().validate(&ctx)?;
            }
            SceneObject::Container(_) | SceneObject::Union(_) => {}
        }
    }
    Ok(())
}

fn validate_csg<'a>(
    name: &str,
    positive: &[CsgMember],
    mut members: impl Iterator<Item = &'a CsgMember>,
) -> Result<()> {
    if positive.is_empty() {
        return Err(SceneError::EmptyCsg(name.to_string()));
    }
    match members.find(|m| !m.object.is_solid()) {
        Some(m) => Err(SceneError::NotSolid {
            csg: name.to_string(),
            member: m.object.name().to_string(),
        }),
        None => Ok(()),
    }
}
