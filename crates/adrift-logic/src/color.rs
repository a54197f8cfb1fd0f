//! Linear RGBA colors and HSV-aware blending.
//!
//! Light ramps blend their endpoint colors through HSV so a red-to-green
//! transition passes through amber instead of desaturated brown. Per-tick
//! smoothing stays in linear RGB, which is sufficient for the small steps
//! it takes.

use serde::{Deserialize, Serialize};

/// A color in linear space with an alpha channel, each component in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearColor {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Component-wise linear interpolation, `t` clamped to [0, 1].
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Interpolate through HSV, taking the shortest path around the hue
    /// wheel. Alpha is blended linearly.
    pub fn lerp_hsv(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let from = Hsv::from_linear(self);
        let to = Hsv::from_linear(other);

        // Shortest signed hue arc in degrees, in [-180, 180).
        let delta = (to.h - from.h + 540.0).rem_euclid(360.0) - 180.0;
        let blended = Hsv {
            h: (from.h + delta * t).rem_euclid(360.0),
            s: from.s + (to.s - from.s) * t,
            v: from.v + (to.v - from.v) * t,
        };

        let mut out = blended.to_linear();
        out.a = self.a + (other.a - self.a) * t;
        out
    }

    /// Largest per-component distance to another color, alpha included.
    pub fn max_component_delta(self, other: Self) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
            .max((self.a - other.a).abs())
    }
}

impl Default for LinearColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Hue (degrees, [0, 360)), saturation, and value, all derived from a
/// [`LinearColor`] with alpha handled separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn from_linear(c: LinearColor) -> Self {
        let max = c.r.max(c.g).max(c.b);
        let min = c.r.min(c.g).min(c.b);
        let chroma = max - min;

        let h = if chroma <= f32::EPSILON {
            0.0
        } else if (max - c.r).abs() <= f32::EPSILON {
            60.0 * (((c.g - c.b) / chroma).rem_euclid(6.0))
        } else if (max - c.g).abs() <= f32::EPSILON {
            60.0 * ((c.b - c.r) / chroma + 2.0)
        } else {
            60.0 * ((c.r - c.g) / chroma + 4.0)
        };

        let s = if max <= f32::EPSILON { 0.0 } else { chroma / max };

        Self { h, s, v: max }
    }

    pub fn to_linear(self) -> LinearColor {
        let chroma = self.v * self.s;
        let h_prime = (self.h.rem_euclid(360.0)) / 60.0;
        let x = chroma * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());

        let (r, g, b) = match h_prime as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let m = self.v - chroma;
        LinearColor::rgb(r + m, g + m, b + m)
    }
}
