//! Player oxygen meter.
//!
//! Oxygen drains continuously and is topped up by canisters scattered
//! around the station. The HUD shows a rounded percentage and switches to
//! a warning tint strictly below the configured low fraction.

use serde::{Deserialize, Serialize};

/// Current and maximum oxygen, both in abstract supply units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OxygenMeter {
    pub max: f32,
    pub current: f32,
}

impl OxygenMeter {
    pub fn full(max: f32) -> Self {
        Self { max, current: max }
    }

    /// Drain by `rate` units per second over `dt`, clamped at zero.
    pub fn drain(&mut self, rate: f32, dt: f32) {
        self.current = (self.current - rate * dt).clamp(0.0, self.max);
    }

    /// Add supply from a canister, clamped at the maximum.
    pub fn add(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    /// Rounded integer percentage for the HUD label.
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }
}

/// Whether the HUD should use the low-oxygen tint. The boundary itself is
/// still normal; only fractions strictly below it warn.
pub fn is_low(fraction: f32, low_fraction: f32) -> bool {
    fraction < low_fraction
}
