//! Linear RGB colour values returned by the tracer.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

/// A linear RGB colour. Components are nominally in `[0, 1]` but may exceed
/// 1 for emissive surfaces and bright lights.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Colour {
    /// Red component.
    pub r: f64,
    /// Green component.
    pub g: f64,
    /// Blue component.
    pub b: f64,
}

impl Colour {
    /// No light.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit intensity in every channel.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a colour from its components.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// A grey of the given intensity.
    pub const fn grey(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Linear interpolation: `self` at `w = 0`, `other` at `w = 1`.
    pub fn lerp(&self, other: &Colour, w: f64) -> Colour {
        *self * (1.0 - w) + *other * w
    }

    /// Whether all components are finite.
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Replace non-finite components with zero and clamp negatives to zero.
    pub fn sanitised(self) -> Colour {
        if !self.is_finite() {
            log::debug!("non-finite colour {self:?} replaced");
        }
        let fix = |c: f64| if c.is_finite() { c.max(0.0) } else { 0.0 };
        Colour::new(fix(self.r), fix(self.g), fix(self.b))
    }

    /// Quantise to 8-bit sRGB-less RGB, clamping to `[0, 1]`.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

impl Add for Colour {
    type Output = Colour;

    fn add(self, rhs: Colour) -> Colour {
        Colour::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Colour {
    fn add_assign(&mut self, rhs: Colour) {
        *self = *self + rhs;
    }
}

impl Mul for Colour {
    type Output = Colour;

    fn mul(self, rhs: Colour) -> Colour {
        Colour::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f64> for Colour {
    type Output = Colour;

    fn mul(self, rhs: f64) -> Colour {
        Colour::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Sum for Colour {
    fn sum<I: Iterator<Item = Colour>>(iter: I) -> Colour {
        iter.fold(Colour::BLACK, |acc, c| acc + c)
    }
}
