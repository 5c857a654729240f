//! Surface properties: what happens to light at a hit.
//!
//! A [`SurfaceProperty`] turns an incident ray and its intersection record
//! into a colour. Properties that need more light call back into the trace
//! driver through [`TraceContext`] with the trace level they were given,
//! which is already one less than the level of the incident ray.
//!
//! Properties are stateless apart from their parameters and are shared
//! between primitives through `Arc`. Composite properties ([`Tiling`],
//! [`WeightedAverage`], [`EitherOr`]) wrap other properties.

mod cloud;
mod colour;
mod composite;
mod hologram;
mod metarefractive;
mod reflective;
mod refractive;
mod teleporting;

pub use cloud::GlowingCloud;
pub use colour::{Emissive, SurfaceColour, Transparent};
pub use composite::{EitherOr, Tiling, WeightedAverage};
pub use hologram::{continue_with_tangential_change, redirect, ImagingHologram, ThinLensHologram};
pub use metarefractive::{rotate_transverse, ComplexMap, Metarefractive, RayRotating};
pub use reflective::Reflective;
pub use refractive::{fresnel_reflectance, Refractive};
pub use teleporting::Teleporting;

use optica_math::Vec3;

use crate::error::{Result, SceneError};
use crate::hit::RaySceneIntersection;
use crate::scene::{NodeId, Primitive, SceneIndex, SceneObject};
use crate::trace::TraceContext;
use crate::{Colour, Ray};

/// Optical behaviour of a surface.
pub trait SurfaceProperty: Send + Sync + std::fmt::Debug {
    /// Colour of the light leaving the surface towards the ray origin.
    ///
    /// `trace_level` is the budget for secondary rays spawned here.
    fn colour(
        &self,
        ray: &Ray,
        hit: &RaySceneIntersection<'_>,
        ctx: &TraceContext<'_>,
        trace_level: u32,
    ) -> Colour;

    /// Whether the surface blocks light from light sources.
    fn casts_shadow(&self) -> bool {
        true
    }

    /// Check parameters and references against the built scene.
    fn validate(&self, _ctx: &ValidationContext<'_>) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Validation
// =============================================================================

/// What a property can see of the scene while it is being validated.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    root: &'a SceneObject,
    index: &'a SceneIndex,
    primitive: &'a Primitive,
    node: NodeId,
}

impl<'a> ValidationContext<'a> {
    pub(crate) fn new(root: &'a SceneObject, index: &'a SceneIndex, primitive: &'a Primitive, node: NodeId) -> Self {
        Self {
            root,
            index,
            primitive,
            node,
        }
    }

    /// The primitive carrying the property.
    pub fn primitive(&self) -> &'a Primitive {
        self.primitive
    }

    /// Index node of that primitive.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Resolve a name that must identify exactly one primitive.
    pub fn resolve_primitive(&self, name: &str) -> Result<(NodeId, &'a Primitive)> {
        let id = match self.index.find(name) {
            [] => return Err(SceneError::UnknownObject(name.to_string())),
            [id] => *id,
            ids => return Err(SceneError::DuplicateName(name.to_string(), ids.len())),
        };
        self.index
            .resolve(self.root, id)
            .and_then(SceneObject::as_primitive)
            .map(|p| (id, p))
            .ok_or_else(|| SceneError::NotAPrimitive(name.to_string()))
    }

    /// An [`SceneError::InvalidParameter`] for this primitive.
    pub fn invalid(&self, reason: impl Into<String>) -> SceneError {
        SceneError::InvalidParameter {
            object: self.primitive.name().to_string(),
            reason: reason.into(),
        }
    }

    /// Require `value` to be finite and in `[0, 1]`.
    pub fn require_unit(&self, what: &str, value: f64) -> Result<()> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(self.invalid(format!("{what} must be in [0, 1], got {value}")))
        }
    }

    /// Require `value` to be finite and strictly positive.
    pub fn require_positive(&self, what: &str, value: f64) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(self.invalid(format!("{what} must be positive, got {value}")))
        }
    }

    /// Require `value` to be finite.
    pub fn require_finite(&self, what: &str, value: f64) -> Result<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(self.invalid(format!("{what} must be finite")))
        }
    }
}

// =============================================================================
// Direction helpers
// =============================================================================

/// Mirror reflection of `d` about the plane with normal `n`.
pub fn reflect(d: &Vec3, n: &Vec3) -> Vec3 {
    d - 2.0 * d.dot(n) * n
}

/// Snell refraction of unit `d` through a surface with unit normal `n`
/// facing against `d`, where `eta` is the ratio of refractive indices
/// (incident side over transmitted side).
///
/// Returns `None` on total internal reflection.
pub fn refract(d: &Vec3, n: &Vec3, eta: f64) -> Option<Vec3> {
    let cos_i = -d.dot(n);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return None;
    }
    Some(eta * d + (eta * cos_i - (1.0 - sin2_t).sqrt()) * n)
}
