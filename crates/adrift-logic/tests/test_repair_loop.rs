//! Integration tests for the repair feedback loop.
//!
//! Exercises: FixState → completion percentages → activation selection
//! → LightRamp targets → per-tick smoothing
//!
//! All tests are pure logic — no ECS, no rendering.

use adrift_logic::color::LinearColor;
use adrift_logic::fixing::{FixState, FixTick, ReleasePolicy};
use adrift_logic::lighting::{
    approach, approach_color, approach_factor, LightRamp, TransitionMode,
};
use adrift_logic::progression::{all_complete, mean_completion, next_activation, EntryState};

// ── Helpers ────────────────────────────────────────────────────────────

struct Bench {
    fix: FixState,
    time_to_fix: f32,
    release: ReleasePolicy,
    completion_pct: f32,
}

impl Bench {
    fn new(time_to_fix: f32, release: ReleasePolicy) -> Self {
        Self {
            fix: FixState::new(),
            time_to_fix,
            release,
            completion_pct: 0.0,
        }
    }

    fn tick(&mut self, dt: f32) -> FixTick {
        let outcome = self.fix.advance(dt, self.time_to_fix, self.release);
        if outcome != FixTick::Idle {
            self.completion_pct = (self.fix.progress * 100.0).clamp(0.0, 100.0);
        }
        outcome
    }
}

// ── Repair → completion → light loop ───────────────────────────────────

#[test]
fn full_repair_drives_light_to_end_state() {
    let mut bench = Bench::new(2.0, ReleasePolicy::Hold);
    let ramp = LightRamp::default();

    bench.fix.begin();
    let mut completions = 0;
    for _ in 0..40 {
        if bench.tick(0.1) == FixTick::Completed {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(bench.completion_pct, 100.0);

    let (color, intensity) = ramp.target(bench.completion_pct);
    assert!(color.max_component_delta(LinearColor::GREEN) < 1e-4);
    assert_eq!(intensity, 3000.0);
}

#[test]
fn interrupted_repair_with_decay_walks_the_ramp_back() {
    let release = ReleasePolicy::Decay { rate: 1.0 };
    let mut bench = Bench::new(4.0, release);
    let ramp = LightRamp::default();

    bench.fix.begin();
    bench.tick(2.0);
    assert!((bench.completion_pct - 50.0).abs() < 1e-3);
    let (_, halfway) = ramp.target(bench.completion_pct);
    assert!((halfway - 1500.0).abs() < 1.0);

    bench.fix.release();
    let mut last_pct = bench.completion_pct;
    for _ in 0..100 {
        bench.tick(0.1);
        assert!(bench.completion_pct <= last_pct);
        last_pct = bench.completion_pct;
    }
    assert_eq!(bench.completion_pct, 0.0);

    let (color, intensity) = ramp.target(bench.completion_pct);
    assert!(color.max_component_delta(LinearColor::RED) < 1e-4);
    assert_eq!(intensity, 0.0);
}

#[test]
fn smooth_mode_converges_on_moving_targets() {
    // The light chases partial-completion targets as a repair progresses,
    // then settles on the end state once the repair lands.
    let TransitionMode::Smooth { speed } = TransitionMode::default() else {
        panic!("default mode should be smooth");
    };
    let ramp = LightRamp::default();
    let mut bench = Bench::new(3.0, ReleasePolicy::Hold);
    bench.fix.begin();

    let mut color = ramp.start_color;
    let mut intensity = ramp.start_intensity;
    for _ in 0..200 {
        bench.tick(0.1);
        let (target_color, target_intensity) = ramp.target(bench.completion_pct);
        let factor = approach_factor(0.1, speed);
        color = approach_color(color, target_color, factor);
        intensity = approach(intensity, target_intensity, factor);
        assert!(intensity <= 3000.0 + 1e-3);
    }

    assert!((intensity - 3000.0).abs() < 1e-3);
    assert!(color.max_component_delta(LinearColor::GREEN) < 1e-3);
}

// ── Activation over a machine bank ─────────────────────────────────────

#[test]
fn completing_machines_in_order_activates_one_at_a_time() {
    let mut entries = vec![
        EntryState { order: 0, completed: false, active: false },
        EntryState { order: 1, completed: false, active: false },
        EntryState { order: 2, completed: false, active: false },
    ];
    let mut percentages = vec![0.0f32; entries.len()];

    // Activate the first puzzle at level start.
    let first = next_activation(&entries).expect("an entry should activate");
    assert_eq!(first, 0);
    entries[first].active = true;

    // Complete each active puzzle in turn.
    for expected_next in [Some(1), Some(2), None] {
        let active = entries.iter().position(|e| e.active).unwrap();
        entries[active].completed = true;
        entries[active].active = false;
        percentages[active] = 100.0;

        let next = next_activation(&entries);
        assert_eq!(next, expected_next);
        if let Some(i) = next {
            entries[i].active = true;
            // Only one entry ever activates per completion.
            assert_eq!(entries.iter().filter(|e| e.active).count(), 1);
        }
    }

    assert!(all_complete(&entries));
    assert_eq!(mean_completion(&percentages), 100.0);
}

#[test]
fn global_progression_tracks_partial_banks() {
    let percentages = [0.0, 50.0, 100.0];
    assert_eq!(mean_completion(&percentages), 50.0);
}
