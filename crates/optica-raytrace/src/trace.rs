//! Recursive trace driver.
//!
//! `trace(ray, level)` finds the closest hit and hands it to the hit
//! primitive's [`SurfaceProperty`](crate::surface::SurfaceProperty), which
//! may call back into [`TraceContext::trace`] with `level - 1` for every
//! secondary ray it needs. The level is an explicit integer, so recursion
//! depth is bounded by [`TraceSettings::max_trace_level`].

use std::cell::RefCell;

use optica_math::{try_dir, Point3, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::hit::RaySceneIntersection;
use crate::scene::Scene;
use crate::{Colour, Ray};

/// Hard cap on the trace level; deeper settings are clamped.
pub const TRACE_LEVEL_LIMIT: u32 = 1000;

/// What a ray that runs out of trace levels contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exhaustion {
    /// Absorbed.
    #[default]
    Black,
    /// As if it had escaped the scene.
    Background,
}

/// Trace-time parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Number of surface interactions a primary ray may undergo.
    pub max_trace_level: u32,
    /// Colour policy for exhausted rays.
    pub exhaustion: Exhaustion,
    /// Minimum hit distance for secondary rays leaving a surface.
    pub surface_offset: f64,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            max_trace_level: 100,
            exhaustion: Exhaustion::Black,
            surface_offset: 1e-6,
        }
    }
}

impl TraceSettings {
    /// Settings with the given trace level and defaults otherwise.
    pub fn with_max_trace_level(max_trace_level: u32) -> Self {
        Self {
            max_trace_level,
            ..Self::default()
        }
    }
}

// =============================================================================
// Trajectories
// =============================================================================

/// One step of a recorded trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// The ray hit a surface.
    Hit {
        /// Remaining trace level when the ray was launched.
        trace_level: u32,
        /// Ray origin.
        origin: Point3,
        /// Ray direction.
        direction: Vec3,
        /// Hit position.
        position: Point3,
        /// Name of the primitive hit.
        object: String,
    },
    /// The ray left the scene.
    Miss {
        /// Remaining trace level when the ray was launched.
        trace_level: u32,
        /// Ray origin.
        origin: Point3,
        /// Ray direction.
        direction: Vec3,
    },
    /// The ray was launched with no trace level left.
    Exhausted {
        /// Ray origin.
        origin: Point3,
        /// Ray direction.
        direction: Vec3,
    },
}

/// Every ray segment of one primary trace, in depth-first order.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    /// Final colour of the primary ray.
    pub colour: Colour,
    /// Recorded events.
    pub events: Vec<TraceEvent>,
}

impl Trajectory {
    /// Number of surface hits.
    pub fn bounces(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Hit { .. }))
            .count()
    }

    /// Hit positions in order.
    pub fn hit_points(&self) -> Vec<Point3> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Hit { position, .. } => Some(*position),
                _ => None,
            })
            .collect()
    }

    /// Whether the trace ended by running out of trace levels.
    pub fn exhausted(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TraceEvent::Exhausted { .. }))
    }
}

// =============================================================================
// Trace context
// =============================================================================

/// Callback handed to surface properties for tracing secondary rays.
#[derive(Debug, Clone, Copy)]
pub struct TraceContext<'a> {
    scene: &'a Scene,
    settings: &'a TraceSettings,
    recorder: Option<&'a RefCell<Vec<TraceEvent>>>,
}

impl<'a> TraceContext<'a> {
    /// A context that does not record trajectories.
    pub fn new(scene: &'a Scene, settings: &'a TraceSettings) -> Self {
        Self {
            scene,
            settings,
            recorder: None,
        }
    }

    fn recording(scene: &'a Scene, settings: &'a TraceSettings, recorder: &'a RefCell<Vec<TraceEvent>>) -> Self {
        Self {
            scene,
            settings,
            recorder: Some(recorder),
        }
    }

    /// The scene being traced.
    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Trace settings.
    pub fn settings(&self) -> &'a TraceSettings {
        self.settings
    }

    fn record(&self, event: impl FnOnce() -> TraceEvent) {
        if let Some(r) = self.recorder {
            r.borrow_mut().push(event());
        }
    }

    /// Colour seen along `ray` with `trace_level` interactions left.
    pub fn trace(&self, ray: &Ray, trace_level: u32) -> Colour {
        if trace_level == 0 {
            self.record(|| TraceEvent::Exhausted {
                origin: ray.origin,
                direction: ray.direction.into_inner(),
            });
            return match self.settings.exhaustion {
                Exhaustion::Black => Colour::BLACK,
                Exhaustion::Background => self.scene.background(),
            };
        }

        match self.scene.closest_intersection(ray) {
            None => {
                self.record(|| TraceEvent::Miss {
                    trace_level,
                    origin: ray.origin,
                    direction: ray.direction.into_inner(),
                });
                self.scene.background()
            }
            Some(hit) => {
                self.record(|| TraceEvent::Hit {
                    trace_level,
                    origin: ray.origin,
                    direction: ray.direction.into_inner(),
                    position: hit.position,
                    object: hit.primitive.name().to_string(),
                });
                hit.primitive
                    .property()
                    .colour(ray, &hit, self, trace_level - 1)
                    .sanitised()
            }
        }
    }

    /// A secondary ray leaving the hit point along `direction`, or `None`
    /// if the direction is degenerate.
    pub fn secondary_ray(&self, incident: &Ray, hit: &RaySceneIntersection<'_>, direction: Vec3) -> Option<Ray> {
        let direction = try_dir(direction)?;
        Some(incident.branch(hit.position, direction, self.settings.surface_offset))
    }

    /// Trace a secondary ray from the hit point. Degenerate directions
    /// are absorbed.
    pub fn trace_from(
        &self,
        incident: &Ray,
        hit: &RaySceneIntersection<'_>,
        direction: Vec3,
        trace_level: u32,
    ) -> Colour {
        match self.secondary_ray(incident, hit, direction) {
            Some(ray) => self.trace(&ray, trace_level),
            None => {
                log::debug!("degenerate secondary direction at {:?}", hit.position);
                Colour::BLACK
            }
        }
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Entry point for tracing primary rays through a scene.
#[derive(Debug, Clone)]
pub struct Tracer<'s> {
    scene: &'s Scene,
    settings: TraceSettings,
}

impl<'s> Tracer<'s> {
    /// A tracer for `scene`. A trace level above [`TRACE_LEVEL_LIMIT`] is
    /// clamped.
    pub fn new(scene: &'s Scene, mut settings: TraceSettings) -> Self {
        if settings.max_trace_level > TRACE_LEVEL_LIMIT {
            log::warn!(
                "max trace level {} clamped to {}",
                settings.max_trace_level,
                TRACE_LEVEL_LIMIT
            );
            settings.max_trace_level = TRACE_LEVEL_LIMIT;
        }
        Self { scene, settings }
    }

    /// The scene being traced.
    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    /// Effective settings.
    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Colour seen along a primary ray.
    pub fn trace(&self, ray: &Ray) -> Colour {
        TraceContext::new(self.scene, &self.settings).trace(ray, self.settings.max_trace_level)
    }

    /// Trace independent primary rays in parallel; results keep input order.
    pub fn trace_all(&self, rays: &[Ray]) -> Vec<Colour> {
        rays.par_iter().map(|r| self.trace(r)).collect()
    }

    /// Trace a primary ray and record every segment.
    pub fn trace_trajectory(&self, ray: &Ray) -> Trajectory {
        let recorder = RefCell::new(Vec::new());
        let colour = TraceContext::recording(self.scene, &self.settings, &recorder)
            .trace(ray, self.settings.max_trace_level);
        Trajectory {
            colour,
            events: recorder.into_inner(),
        }
    }
}
