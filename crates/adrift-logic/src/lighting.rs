//! Completion-driven light feedback.
//!
//! Each puzzle light has a ramp from a "broken" look to a "repaired" look.
//! The completion percentage picks a target along the ramp; the per-tick
//! smoothing step then eases the applied values toward that target without
//! ever overshooting it.

use serde::{Deserialize, Serialize};

use crate::color::LinearColor;

/// Endpoint looks for a light bound to a puzzle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LightRamp {
    pub start_color: LinearColor,
    pub end_color: LinearColor,
    pub start_intensity: f32,
    pub end_intensity: f32,
}

impl LightRamp {
    /// Target color and intensity for a completion percentage in [0, 100].
    /// Color blends through HSV; intensity blends linearly.
    pub fn target(&self, completion_pct: f32) -> (LinearColor, f32) {
        let alpha = (completion_pct / 100.0).clamp(0.0, 1.0);
        (
            self.start_color.lerp_hsv(self.end_color, alpha),
            self.start_intensity + (self.end_intensity - self.start_intensity) * alpha,
        )
    }
}

impl Default for LightRamp {
    fn default() -> Self {
        Self {
            start_color: LinearColor::RED,
            end_color: LinearColor::GREEN,
            start_intensity: 0.0,
            end_intensity: 3000.0,
        }
    }
}

/// How applied light values chase their targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionMode {
    /// Targets are applied directly each tick.
    Immediate,
    /// Exponential approach: `current = lerp(current, target, dt * speed)`.
    Smooth { speed: f32 },
}

impl Default for TransitionMode {
    fn default() -> Self {
        TransitionMode::Smooth { speed: 2.0 }
    }
}

/// Blend factor for one smoothing step. Clamped to 1 so oversized frame
/// deltas land on the target instead of past it.
pub fn approach_factor(dt: f32, speed: f32) -> f32 {
    (dt * speed).clamp(0.0, 1.0)
}

/// One smoothing step for a scalar.
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor.clamp(0.0, 1.0)
}

/// One smoothing step for a color, applied per channel in linear space.
pub fn approach_color(current: LinearColor, target: LinearColor, factor: f32) -> LinearColor {
    current.lerp(target, factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        let ramp = LightRamp::default();
        let (c0, i0) = ramp.target(0.0);
        let (c1, i1) = ramp.target(100.0);
        assert!(c0.max_component_delta(LinearColor::RED) < 1e-4);
        assert!(c1.max_component_delta(LinearColor::GREEN) < 1e-4);
        assert_eq!(i0, 0.0);
        assert_eq!(i1, 3000.0);
    }

    #[test]
    fn test_ramp_clamps_percentage() {
        let ramp = LightRamp::default();
        let (over, i_over) = ramp.target(150.0);
        let (at_end, i_end) = ramp.target(100.0);
        assert!(over.max_component_delta(at_end) < 1e-6);
        assert_eq!(i_over, i_end);
    }

    #[test]
    fn test_smooth_approach_converges_without_overshoot() {
        // Red at zero intensity chasing green at 3000, speed 2.0, 0.1s ticks.
        let ramp = LightRamp::default();
        let (target_color, target_intensity) = ramp.target(100.0);

        let mut color = LinearColor::RED;
        let mut intensity = 0.0f32;
        let mut last_gap = f32::MAX;

        for _ in 0..150 {
            let factor = approach_factor(0.1, 2.0);
            color = approach_color(color, target_color, factor);
            intensity = approach(intensity, target_intensity, factor);

            assert!(intensity <= target_intensity + 1e-3, "overshot intensity");
            let gap = (target_intensity - intensity).abs();
            assert!(gap <= last_gap + 1e-6, "approach was not monotone");
            last_gap = gap;
        }

        assert!((intensity - target_intensity).abs() < 1e-3);
        assert!(color.max_component_delta(target_color) < 1e-3);
    }

    #[test]
    fn test_large_step_lands_on_target() {
        // dt * speed beyond 1 must clamp, not extrapolate.
        let v = approach(0.0, 10.0, approach_factor(3.0, 2.0));
        assert_eq!(v, 10.0);
    }
}
