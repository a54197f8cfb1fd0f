//! Adrift Headless Gameplay Harness
//!
//! Validates the repair loop, survival systems, and level data without a
//! renderer. Runs entirely in-process — no engine, no windowing, no audio.
//!
//! Usage:
//!   cargo run -p adrift-simtest
//!   cargo run -p adrift-simtest -- --verbose

use adrift_core::components::{Machine, SpotLamp, StalkerStatue, Transform, Vec3};
use adrift_core::engine::GameEngine;
use adrift_core::events::WorldEvent;
use adrift_core::level::{load_manifest, spawn_level, LevelManifest, ReleaseSpec};

// ── Level manifest (same JSON a shipped build loads) ────────────────────
const MANIFEST_JSON: &str = include_str!("../../../data/station_level.json");

const TICK: f32 = 0.05;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    println!("=== Adrift Gameplay Harness ===\n");

    let mut results = Vec::new();

    // 1. Level manifest validation
    results.extend(validate_manifest(verbose));

    // 2. The repair loop end to end
    results.extend(validate_repair_loop(verbose));

    // 3. Decay and release policies
    results.extend(validate_release_policies(verbose));

    // 4. Puzzle activation ordering
    results.extend(validate_activation_order(verbose));

    // 5. Light feedback convergence
    results.extend(validate_light_feedback(verbose));

    // 6. Oxygen survival
    results.extend(validate_oxygen(verbose));

    // 7. Dialogue sequencing
    results.extend(validate_dialogue(verbose));

    // 8. Stalker hazard
    results.extend(validate_stalker(verbose));

    // 9. Save/load roundtrip
    results.extend(validate_save_load(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn manifest() -> LevelManifest {
    load_manifest(MANIFEST_JSON).expect("bundled manifest must parse")
}

fn engine() -> GameEngine {
    spawn_level(&manifest()).expect("bundled manifest must spawn")
}

/// Aim the player at a world position from the origin.
fn aim(engine: &mut GameEngine, target: Vec3) {
    engine.set_view(Vec3::ZERO, target);
    engine.update(TICK);
}

fn machine_position(engine: &GameEngine, id: u32) -> Vec3 {
    engine
        .world
        .query::<(&Machine, &Transform)>()
        .iter()
        .find(|(_, (m, _))| m.id == id)
        .map(|(_, (_, t))| t.position)
        .expect("machine exists")
}

/// Hold interact on a machine until it reports fixed (or the tick cap
/// runs out).
fn fix_machine(engine: &mut GameEngine, id: u32) {
    let target = machine_position(engine, id);
    aim(engine, target);
    engine.begin_interact();
    for _ in 0..4000 {
        engine.update(TICK);
        let done = engine
            .world
            .query::<&Machine>()
            .iter()
            .any(|(_, m)| m.id == id && m.is_fixed());
        if done {
            break;
        }
    }
    engine.end_interact();
}

// ── 1. Level Manifest ───────────────────────────────────────────────────

fn validate_manifest(verbose: bool) -> Vec<TestResult> {
    println!("--- Level Manifest ---");
    let mut results = Vec::new();

    let manifest: LevelManifest = match load_manifest(MANIFEST_JSON) {
        Ok(m) => m,
        Err(e) => {
            results.push(TestResult {
                name: "manifest_parse".into(),
                passed: false,
                detail: format!("parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "manifest_has_machines".into(),
        passed: !manifest.machines.is_empty(),
        detail: format!("{} machines", manifest.machines.len()),
    });

    let mut names: Vec<&str> = manifest.machines.iter().map(|m| m.name.as_str()).collect();
    names.sort();
    let unique = {
        let before = names.len();
        names.dedup();
        names.len() == before
    };
    results.push(TestResult {
        name: "manifest_unique_machine_names".into(),
        passed: unique,
        detail: "machine names are unique".into(),
    });

    let bad_ttf = manifest
        .machines
        .iter()
        .filter(|m| m.time_to_fix <= 0.0)
        .count();
    results.push(TestResult {
        name: "manifest_positive_time_to_fix".into(),
        passed: bad_ttf == 0,
        detail: format!("{} machines with non-positive time_to_fix", bad_ttf),
    });

    let dangling = manifest
        .lights
        .iter()
        .filter(|l| !manifest.machines.iter().any(|m| m.name == l.machine))
        .count();
    results.push(TestResult {
        name: "manifest_lights_resolve".into(),
        passed: dangling == 0,
        detail: format!("{} lights bound to unknown machines", dangling),
    });

    results.push(TestResult {
        name: "manifest_oxygen_sane".into(),
        passed: manifest.player.oxygen.max > 0.0 && manifest.player.oxygen.drain_rate > 0.0,
        detail: format!(
            "max={} drain={}/s",
            manifest.player.oxygen.max, manifest.player.oxygen.drain_rate
        ),
    });

    if verbose {
        println!("  Machines by order:");
        let mut by_order: Vec<_> = manifest.machines.iter().collect();
        by_order.sort_by_key(|m| m.order);
        for m in by_order {
            println!("    {:3} {} ({}s)", m.order, m.name, m.time_to_fix);
        }
    }

    results
}

// ── 2. Repair Loop ──────────────────────────────────────────────────────

fn validate_repair_loop(_verbose: bool) -> Vec<TestResult> {
    println!("--- Repair Loop ---");
    let mut results = Vec::new();

    let mut game = engine();
    let generator = machine_position(&game, 0);

    // Highlight on aim.
    aim(&mut game, generator);
    results.push(TestResult {
        name: "repair_highlight_on_aim".into(),
        passed: game.highlighted().is_some() && game.hud.prompt.visible,
        detail: format!("prompt: '{}'", game.hud.prompt.text),
    });

    // Progress bar appears while fixing.
    game.begin_interact();
    game.update(TICK);
    let bar_shown = game.hud.progress_bar.visible;

    fix_machine(&mut game, 0);
    let fixed = game
        .world
        .query::<&Machine>()
        .iter()
        .any(|(_, m)| m.id == 0 && m.is_fixed());

    results.push(TestResult {
        name: "repair_bar_then_fixed".into(),
        passed: bar_shown && fixed,
        detail: format!("bar_shown={} fixed={}", bar_shown, fixed),
    });

    results.push(TestResult {
        name: "repair_bar_hides_after_fix".into(),
        passed: !game.hud.progress_bar.visible,
        detail: "progress bar hidden after completion".into(),
    });

    let global = game.global_progression();
    results.push(TestResult {
        name: "repair_global_is_mean".into(),
        passed: (global - 100.0 / 3.0).abs() < 0.1,
        detail: format!("1 of 3 fixed → {:.1}%", global),
    });

    // A fixed machine no longer highlights or prompts.
    aim(&mut game, generator);
    results.push(TestResult {
        name: "repair_fixed_machine_inert".into(),
        passed: game.highlighted().is_none() && !game.hud.prompt.visible,
        detail: "fixed machine refuses highlight".into(),
    });

    results
}

// ── 3. Release Policies ─────────────────────────────────────────────────

fn validate_release_policies(_verbose: bool) -> Vec<TestResult> {
    println!("--- Release Policies ---");
    let mut results = Vec::new();

    // The generator decays at rate 0.5 once released.
    let mut game = engine();
    let generator = machine_position(&game, 0);
    aim(&mut game, generator);
    game.begin_interact();
    for _ in 0..40 {
        game.update(TICK);
    }
    let held: f32 = game
        .world
        .query::<&Machine>()
        .iter()
        .find(|(_, m)| m.id == 0)
        .map(|(_, m)| m.progress())
        .unwrap();

    game.end_interact();
    for _ in 0..20 {
        game.update(TICK);
    }
    let released: f32 = game
        .world
        .query::<&Machine>()
        .iter()
        .find(|(_, m)| m.id == 0)
        .map(|(_, m)| m.progress())
        .unwrap();

    results.push(TestResult {
        name: "release_decay_drains".into(),
        passed: held > 0.0 && released < held && released >= 0.0,
        detail: format!("{:.3} → {:.3} after release", held, released),
    });

    // The recycler holds progress (no decay configured).
    let manifest = manifest();
    let holds = matches!(manifest.machines[1].release, ReleaseSpec::Hold);
    let mut game = engine();
    let recycler = machine_position(&game, 1);
    aim(&mut game, recycler);
    game.begin_interact();
    for _ in 0..20 {
        game.update(TICK);
    }
    let held: f32 = game
        .world
        .query::<&Machine>()
        .iter()
        .find(|(_, m)| m.id == 1)
        .map(|(_, m)| m.progress())
        .unwrap();
    game.end_interact();
    for _ in 0..40 {
        game.update(TICK);
    }
    let after: f32 = game
        .world
        .query::<&Machine>()
        .iter()
        .find(|(_, m)| m.id == 1)
        .map(|(_, m)| m.progress())
        .unwrap();

    results.push(TestResult {
        name: "release_hold_freezes".into(),
        passed: holds && (after - held).abs() < 1e-6,
        detail: format!("held at {:.3}", after),
    });

    results
}

// ── 4. Activation Order ─────────────────────────────────────────────────

fn validate_activation_order(_verbose: bool) -> Vec<TestResult> {
    println!("--- Activation Order ---");
    let mut results = Vec::new();

    let mut game = engine();
    results.push(TestResult {
        name: "activation_starts_with_lowest_order".into(),
        passed: game.hud.objective.text == "Restore main power",
        detail: format!("first objective: '{}'", game.hud.objective.text),
    });

    fix_machine(&mut game, 0);
    results.push(TestResult {
        name: "activation_advances_on_completion".into(),
        passed: game.hud.objective.text == "Restart the air recycler",
        detail: format!("second objective: '{}'", game.hud.objective.text),
    });

    // Exactly one active entry at all times until the board is done.
    let active = game
        .board()
        .entries()
        .iter()
        .filter(|e| e.active)
        .count();
    results.push(TestResult {
        name: "activation_single_active_entry".into(),
        passed: active == 1,
        detail: format!("{} active entries", active),
    });

    fix_machine(&mut game, 1);
    fix_machine(&mut game, 2);

    let events = game.drain_events();
    results.push(TestResult {
        name: "activation_all_fixed_announced".into(),
        passed: events.contains(&WorldEvent::AllMachinesFixed),
        detail: format!("{} events, global={:.0}%", events.len(), game.global_progression()),
    });

    results
}

// ── 5. Light Feedback ───────────────────────────────────────────────────

fn validate_light_feedback(_verbose: bool) -> Vec<TestResult> {
    println!("--- Light Feedback ---");
    let mut results = Vec::new();

    let mut game = engine();
    fix_machine(&mut game, 0);

    // Smooth mode: the generator bay lamp glides to 3000 with no overshoot.
    let mut last = 0.0f32;
    let mut overshoot = false;
    for _ in 0..200 {
        game.update(TICK);
        let lamp: SpotLamp = game
            .world
            .query::<&SpotLamp>()
            .iter()
            .find(|(_, l)| l.id == 0)
            .map(|(_, l)| *l)
            .unwrap();
        if lamp.intensity > 3000.0 + 1e-3 || lamp.intensity < last - 1e-3 {
            overshoot = true;
        }
        last = lamp.intensity;
    }

    results.push(TestResult {
        name: "light_converges_no_overshoot".into(),
        passed: !overshoot && (last - 3000.0).abs() < 1e-1,
        detail: format!("settled at {:.2}", last),
    });

    // The recycler lamp has not moved off its start intensity target.
    let recycler_lamp: SpotLamp = game
        .world
        .query::<&SpotLamp>()
        .iter()
        .find(|(_, l)| l.id == 1)
        .map(|(_, l)| *l)
        .unwrap();
    results.push(TestResult {
        name: "light_unrelated_lamp_untouched".into(),
        passed: (recycler_lamp.intensity - 200.0).abs() < 1.0,
        detail: format!("recycler lamp at {:.1}", recycler_lamp.intensity),
    });

    results
}

// ── 6. Oxygen ───────────────────────────────────────────────────────────

fn validate_oxygen(_verbose: bool) -> Vec<TestResult> {
    println!("--- Oxygen ---");
    let mut results = Vec::new();

    let mut game = engine();
    for _ in 0..100 {
        game.update(TICK);
    }
    let drained = game.oxygen_fraction().unwrap_or(1.0);
    results.push(TestResult {
        name: "oxygen_drains_over_time".into(),
        passed: drained < 1.0 && drained > 0.0,
        detail: format!("at {:.0}% after 5s, hud '{}'", drained * 100.0, game.hud.oxygen.text),
    });

    // Grab a canister and watch the readout rise.
    let canister = Vec3::new(2.0, -2.0, 0.0);
    aim(&mut game, canister);
    let before = game.oxygen_fraction().unwrap();
    game.begin_interact();
    game.update(TICK);
    game.end_interact();
    let after = game.oxygen_fraction().unwrap();

    results.push(TestResult {
        name: "oxygen_canister_replenishes".into(),
        passed: after > before,
        detail: format!("{:.0}% → {:.0}%", before * 100.0, after * 100.0),
    });

    // Consumed canisters stop prompting.
    aim(&mut game, canister);
    results.push(TestResult {
        name: "oxygen_canister_single_use".into(),
        passed: game.highlighted().is_none(),
        detail: "spent canister refuses highlight".into(),
    });

    results
}

// ── 7. Dialogue ─────────────────────────────────────────────────────────

fn validate_dialogue(_verbose: bool) -> Vec<TestResult> {
    println!("--- Dialogue ---");
    let mut results = Vec::new();

    let mut game = engine();
    let full_lines: Vec<String> = manifest()
        .dialogue
        .map(|d| d.entries.into_iter().map(|e| e.text).collect())
        .unwrap_or_default();

    let mut saw_partial = false;
    let mut finished = false;
    for _ in 0..1000 {
        game.update(TICK);
        if game.hud.dialogue.visible
            && !game.hud.dialogue.text.is_empty()
            && !full_lines.contains(&game.hud.dialogue.text)
        {
            saw_partial = true;
        }
        if game
            .drain_events()
            .iter()
            .any(|e| matches!(e, WorldEvent::DialogueFinished { .. }))
        {
            finished = true;
            break;
        }
    }

    results.push(TestResult {
        name: "dialogue_types_then_finishes".into(),
        passed: saw_partial && finished,
        detail: format!("partial={} finished={}", saw_partial, finished),
    });

    results.push(TestResult {
        name: "dialogue_hidden_after_finish".into(),
        passed: !game.hud.dialogue.visible,
        detail: "dialogue widget hidden".into(),
    });

    results
}

// ── 8. Stalker ──────────────────────────────────────────────────────────

fn validate_stalker(_verbose: bool) -> Vec<TestResult> {
    println!("--- Stalker ---");
    let mut results = Vec::new();

    let mut game = engine();
    let start = game
        .world
        .query::<(&StalkerStatue, &Transform)>()
        .iter()
        .next()
        .map(|(_, (_, t))| t.position)
        .unwrap();

    // Look away: it closes in.
    game.set_view(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
    for _ in 0..20 {
        game.update(TICK);
    }
    let crept = game
        .world
        .query::<(&StalkerStatue, &Transform)>()
        .iter()
        .next()
        .map(|(_, (_, t))| t.position)
        .unwrap();
    let closed = start.distance(&Vec3::ZERO) - crept.distance(&Vec3::ZERO);

    results.push(TestResult {
        name: "stalker_advances_unobserved".into(),
        passed: closed > 0.0,
        detail: format!("closed {:.2} units in 1s", closed),
    });

    // Stare at it: it freezes.
    game.set_view(Vec3::ZERO, crept);
    for _ in 0..20 {
        game.update(TICK);
    }
    let stared = game
        .world
        .query::<(&StalkerStatue, &Transform)>()
        .iter()
        .next()
        .map(|(_, (_, t))| t.position)
        .unwrap();

    results.push(TestResult {
        name: "stalker_freezes_observed".into(),
        passed: stared == crept,
        detail: "no movement while watched".into(),
    });

    results
}

// ── 9. Save/Load ────────────────────────────────────────────────────────

fn validate_save_load(_verbose: bool) -> Vec<TestResult> {
    println!("--- Save/Load ---");
    let mut results = Vec::new();

    let mut game = engine();
    fix_machine(&mut game, 0);
    let global_before = game.global_progression();

    let mut buffer = Vec::new();
    if let Err(e) = game.save(&mut buffer) {
        results.push(TestResult {
            name: "save_writes".into(),
            passed: false,
            detail: format!("save failed: {}", e),
        });
        return results;
    }
    results.push(TestResult {
        name: "save_writes".into(),
        passed: !buffer.is_empty(),
        detail: format!("{} bytes", buffer.len()),
    });

    let mut restored = engine();
    if let Err(e) = restored.load(&buffer[..]) {
        results.push(TestResult {
            name: "load_restores".into(),
            passed: false,
            detail: format!("load failed: {}", e),
        });
        return results;
    }

    results.push(TestResult {
        name: "load_restores".into(),
        passed: (restored.global_progression() - global_before).abs() < 1e-3,
        detail: format!("global {:.1}% after load", restored.global_progression()),
    });

    // The relinked board still completes.
    fix_machine(&mut restored, 1);
    fix_machine(&mut restored, 2);
    let events = restored.drain_events();
    results.push(TestResult {
        name: "load_board_still_completes".into(),
        passed: events.contains(&WorldEvent::AllMachinesFixed),
        detail: format!("global {:.0}%", restored.global_progression()),
    });

    results
}
