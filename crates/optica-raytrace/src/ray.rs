//! Ray representation.

use optica_math::{try_dir, Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
///
/// Besides the geometric line, a ray carries a time tag (for scenes that
/// vary with time) and the minimum distance a hit must lie beyond the
/// origin to count. Secondary rays leaving a surface use a small positive
/// minimum distance so they do not re-hit the surface they start on.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Time at which the ray is launched.
    pub time: f64,
    /// Hits at `t <= min_distance` are ignored.
    pub min_distance: f64,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized. A zero or non-finite direction
    /// yields a ray with NaN components that intersects nothing; use
    /// [`Ray::try_new`] to catch that case.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: Dir3::new_normalize(direction),
            time: 0.0,
            min_distance: 0.0,
        }
    }

    /// Create a ray, or `None` if `direction` cannot be normalized.
    pub fn try_new(origin: Point3, direction: Vec3) -> Option<Self> {
        let direction = try_dir(direction)?;
        Some(Self {
            origin,
            direction,
            time: 0.0,
            min_distance: 0.0,
        })
    }

    /// Set the launch time.
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Set the minimum hit distance.
    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// A new ray launched from `origin` along `direction` that inherits this
    /// ray's time tag.
    pub fn branch(&self, origin: Point3, direction: Dir3, min_distance: f64) -> Self {
        Self {
            origin,
            direction,
            time: self.time,
            min_distance,
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Whether a hit at parameter `t` counts for this ray.
    #[inline]
    pub fn accepts(&self, t: f64) -> bool {
        t.is_finite() && t > self.min_distance
    }
}
