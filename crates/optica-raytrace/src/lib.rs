#![warn(missing_docs)]

//! Recursive ray tracing through scenes of analytic shapes with
//! meta-optical surface properties.
//!
//! A scene is a tree of primitives (a shape plus a surface property)
//! grouped by containers and CSG combinations. Tracing a ray finds the
//! nearest intersection with the whole tree and asks the surface property
//! of the primitive that was hit for the colour; recursive properties
//! (mirrors, refracting and metarefractive windows, holograms,
//! teleporters) trace secondary rays with one trace level less.
//!
//! # Architecture
//!
//! - [`Ray`] - origin, unit direction, time and minimum hit distance
//! - [`intersect`] - analytic ray-shape intersection, one file per shape
//! - [`span`] - inside/outside intervals along a ray for CSG
//! - [`scene`] - scene graph, name index and validating builder
//! - [`surface`] - surface properties
//! - [`light`] - light sources used by [`surface::SurfaceColour`]
//! - [`trace`] - trace driver, settings and trajectory recording
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use optica_geom::Sphere;
//! use optica_math::{Point3, Vec3};
//! use optica_raytrace::{Colour, Primitive, Ray, SceneBuilder, TraceSettings, Tracer};
//! use optica_raytrace::surface::Emissive;
//!
//! let scene = SceneBuilder::new("demo")
//!     .add_scene_object(Primitive::new(
//!         "ball",
//!         Sphere::with_center(Point3::new(0.0, 0.0, 5.0), 1.0),
//!         Arc::new(Emissive::new(Colour::WHITE)),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let tracer = Tracer::new(&scene, TraceSettings::default());
//! let colour = tracer.trace(&Ray::new(Point3::origin(), Vec3::z()));
//! assert_eq!(colour, Colour::WHITE);
//! ```

mod colour;
mod error;
mod hit;
mod ray;
pub mod intersect;
pub mod light;
pub mod scene;
pub mod span;
pub mod surface;
pub mod trace;

pub use colour::Colour;
pub use error::{Result, SceneError};
pub use hit::RaySceneIntersection;
pub use light::{AmbientLight, LightSource, PointLight};
pub use ray::Ray;
pub use scene::{Container, Difference, Intersection, Primitive, Scene, SceneBuilder, SceneObject, Union};
pub use trace::{Exhaustion, TraceContext, TraceEvent, TraceSettings, Tracer, Trajectory};
