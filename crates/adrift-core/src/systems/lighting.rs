//! Per-tick light feedback.
//!
//! Moves every binding's applied color and intensity toward its target and
//! writes the result into the bound lamp. Runs after the board has
//! consumed this tick's machine signals, so targets are always current.

use hecs::World;

use adrift_logic::lighting::{approach, approach_color, approach_factor, TransitionMode};

use crate::components::SpotLamp;
use crate::systems::puzzle::PuzzleBoard;

pub fn lighting_system(world: &mut World, board: &mut PuzzleBoard, dt: f32) {
    let mode = board.transition();
    for binding in board.lights_mut() {
        match mode {
            TransitionMode::Immediate => {
                binding.current_color = binding.target_color;
                binding.current_intensity = binding.target_intensity;
            }
            TransitionMode::Smooth { speed } => {
                let factor = approach_factor(dt, speed);
                binding.current_color =
                    approach_color(binding.current_color, binding.target_color, factor);
                binding.current_intensity =
                    approach(binding.current_intensity, binding.target_intensity, factor);
            }
        }

        // A missing lamp is a no-op; the binding keeps interpolating so it
        // is current again if the lamp comes back.
        let Some(light) = binding.light else { continue };
        if let Ok(mut lamp) = world.get::<&mut SpotLamp>(light) {
            lamp.color = binding.current_color;
            lamp.intensity = binding.current_intensity;
        }
    }
}
