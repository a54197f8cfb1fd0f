//! Level manifests: the JSON the level designer hands the engine.
//!
//! A manifest names every machine, light, canister, and hazard in the
//! level along with its tunables. [`spawn_level`] turns one into a live
//! [`GameEngine`] with the board wired and the first puzzle active.
//! Manifest problems are real errors - a level that references a machine
//! that does not exist should fail loudly at load, not limp along.

use std::collections::HashMap;

use hecs::World;
use serde::{Deserialize, Serialize};
use tracing::info;

use adrift_logic::color::LinearColor;
use adrift_logic::countdown::Countdown;
use adrift_logic::fixing::ReleasePolicy;
use adrift_logic::lighting::{LightRamp, TransitionMode};

use crate::components::{
    ExitGate, Machine, Name, OxygenCanister, OxygenSupply, Player, PuzzleId, SpotLamp,
    StalkerStatue, Transform, Vec3,
};
use crate::engine::GameEngine;
use crate::systems::{DialogueEntry, DialogueSequencer, LightBinding, PuzzleEntry, PuzzleBoard};

/// Errors raised while parsing or spawning a manifest.
#[derive(Debug)]
pub enum LevelError {
    Parse(serde_json::Error),
    UnknownMachine { light: String, machine: String },
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Parse(e) => write!(f, "Manifest parse error: {}", e),
            LevelError::UnknownMachine { light, machine } => {
                write!(f, "Light '{}' is bound to unknown machine '{}'", light, machine)
            }
        }
    }
}

impl std::error::Error for LevelError {}

fn default_interaction_range() -> f32 {
    5.0
}

fn default_time_to_fix() -> f32 {
    3.0
}

fn default_prompt() -> String {
    "Hold [E] to Fix".to_string()
}

fn default_white() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_red() -> [f32; 4] {
    [1.0, 0.0, 0.0, 1.0]
}

fn default_green() -> [f32; 4] {
    [0.0, 1.0, 0.0, 1.0]
}

fn default_end_intensity() -> f32 {
    3000.0
}

fn default_type_speed() -> f32 {
    0.05
}

fn default_delay_after() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_canister_amount() -> f32 {
    40.0
}

fn default_stalker_speed() -> f32 {
    1.5
}

fn default_warning_fraction() -> f32 {
    0.25
}

fn color(rgba: [f32; 4]) -> LinearColor {
    LinearColor::new(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn vec3(xyz: [f32; 3]) -> Vec3 {
    Vec3::new(xyz[0], xyz[1], xyz[2])
}

/// JSON-facing release policy. The runtime enum stays plainly derived so
/// binary saves round-trip; this one reads the way designers write it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum ReleaseSpec {
    Hold,
    Decay { rate: f32 },
}

impl Default for ReleaseSpec {
    fn default() -> Self {
        ReleaseSpec::Hold
    }
}

impl From<ReleaseSpec> for ReleasePolicy {
    fn from(spec: ReleaseSpec) -> Self {
        match spec {
            ReleaseSpec::Hold => ReleasePolicy::Hold,
            ReleaseSpec::Decay { rate } => ReleasePolicy::Decay { rate },
        }
    }
}

/// JSON-facing light transition mode; same story as [`ReleaseSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TransitionSpec {
    Immediate,
    Smooth { speed: f32 },
}

impl Default for TransitionSpec {
    fn default() -> Self {
        TransitionSpec::Smooth { speed: 2.0 }
    }
}

impl From<TransitionSpec> for TransitionMode {
    fn from(spec: TransitionSpec) -> Self {
        match spec {
            TransitionSpec::Immediate => TransitionMode::Immediate,
            TransitionSpec::Smooth { speed } => TransitionMode::Smooth { speed },
        }
    }
}

/// The whole level as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelManifest {
    pub name: String,
    pub player: PlayerSpec,
    #[serde(default = "default_interaction_range")]
    pub interaction_range: f32,
    #[serde(default)]
    pub light_transition: TransitionSpec,
    pub machines: Vec<MachineSpec>,
    #[serde(default)]
    pub lights: Vec<LightSpec>,
    #[serde(default)]
    pub canisters: Vec<CanisterSpec>,
    #[serde(default)]
    pub exit: Option<GateSpec>,
    #[serde(default)]
    pub stalkers: Vec<StalkerSpec>,
    #[serde(default)]
    pub dialogue: Option<DialogueSpec>,
    #[serde(default)]
    pub countdown: Option<CountdownSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub position: [f32; 3],
    pub oxygen: OxygenSpec,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OxygenSpec {
    pub max: f32,
    pub drain_rate: f32,
    #[serde(default = "default_half")]
    pub low_fraction: f32,
}

fn default_half() -> f32 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSpec {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default = "default_time_to_fix")]
    pub time_to_fix: f32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub release: ReleaseSpec,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub task: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightSpec {
    pub name: String,
    /// Name of the machine whose puzzle this light follows.
    pub machine: String,
    #[serde(default = "default_red")]
    pub start_color: [f32; 4],
    #[serde(default = "default_green")]
    pub end_color: [f32; 4],
    #[serde(default)]
    pub start_intensity: f32,
    #[serde(default = "default_end_intensity")]
    pub end_intensity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanisterSpec {
    pub position: [f32; 3],
    #[serde(default = "default_canister_amount")]
    pub amount: f32,
    #[serde(default = "default_true")]
    pub single_use: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSpec {
    pub position: [f32; 3],
    pub destination: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalkerSpec {
    pub position: [f32; 3],
    #[serde(default = "default_stalker_speed")]
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSpec {
    pub name: String,
    #[serde(default)]
    pub intro_delay: f32,
    #[serde(default = "default_true")]
    pub advance_on_input: bool,
    pub entries: Vec<DialogueEntrySpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueEntrySpec {
    pub text: String,
    #[serde(default = "default_white")]
    pub color: [f32; 4],
    #[serde(default = "default_type_speed")]
    pub type_speed: f32,
    #[serde(default = "default_delay_after")]
    pub delay_after: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountdownSpec {
    pub seconds: f32,
    #[serde(default = "default_warning_fraction")]
    pub warning_fraction: f32,
}

/// Parse a manifest from JSON text.
pub fn load_manifest(json: &str) -> Result<LevelManifest, LevelError> {
    Ok(serde_json::from_str(json)?)
}

/// Build a live engine from a manifest.
pub fn spawn_level(manifest: &LevelManifest) -> Result<GameEngine, LevelError> {
    let mut world = World::new();

    let player = world.spawn((
        Player,
        Transform::at(vec3(manifest.player.position)),
        OxygenSupply {
            low_fraction: manifest.player.oxygen.low_fraction,
            ..OxygenSupply::new(manifest.player.oxygen.max, manifest.player.oxygen.drain_rate)
        },
    ));

    // Machines and their puzzle entries. The machine's stable id doubles
    // as its puzzle id; both are just the manifest position.
    let mut machines_by_name = HashMap::new();
    let mut entries = Vec::with_capacity(manifest.machines.len());
    for (index, spec) in manifest.machines.iter().enumerate() {
        let id = index as u32;
        let entity = world.spawn((
            Machine::new(id, spec.time_to_fix)
                .with_release(spec.release.into())
                .with_prompt(spec.prompt.clone()),
            Name::new(spec.name.clone()),
            Transform::at(vec3(spec.position)),
        ));
        machines_by_name.insert(spec.name.clone(), (entity, PuzzleId(id)));
        entries.push(
            PuzzleEntry::new(PuzzleId(id), entity, id, spec.order)
                .with_text(spec.objective.clone(), spec.task.clone()),
        );
    }

    let mut lights = Vec::with_capacity(manifest.lights.len());
    for (index, spec) in manifest.lights.iter().enumerate() {
        let &(_, puzzle) =
            machines_by_name
                .get(&spec.machine)
                .ok_or_else(|| LevelError::UnknownMachine {
                    light: spec.name.clone(),
                    machine: spec.machine.clone(),
                })?;
        let id = index as u32;
        let entity = world.spawn((SpotLamp::new(id), Name::new(spec.name.clone())));
        lights.push(LightBinding::new(
            entity,
            id,
            puzzle,
            LightRamp {
                start_color: color(spec.start_color),
                end_color: color(spec.end_color),
                start_intensity: spec.start_intensity,
                end_intensity: spec.end_intensity,
            },
        ));
    }

    for spec in &manifest.canisters {
        let mut canister = OxygenCanister::new(spec.amount);
        canister.single_use = spec.single_use;
        world.spawn((canister, Transform::at(vec3(spec.position))));
    }

    if let Some(gate) = &manifest.exit {
        world.spawn((
            ExitGate::new(gate.destination.clone()),
            Transform::at(vec3(gate.position)),
        ));
    }

    for spec in &manifest.stalkers {
        world.spawn((
            StalkerStatue::new(spec.speed),
            Transform::at(vec3(spec.position)),
        ));
    }

    let board = PuzzleBoard::new(entries, lights, manifest.light_transition.into());
    let mut engine = GameEngine::new(world, board, player, manifest.interaction_range);

    if let Some(spec) = &manifest.dialogue {
        let entries = spec
            .entries
            .iter()
            .map(|e| DialogueEntry {
                text: e.text.clone(),
                color: color(e.color),
                type_speed: e.type_speed,
                delay_after: e.delay_after,
            })
            .collect();
        let mut sequencer = DialogueSequencer::new(spec.name.clone(), entries, spec.intro_delay);
        if !spec.advance_on_input {
            sequencer = sequencer.auto_advancing();
        }
        engine = engine.with_dialogue(sequencer);
    }

    if let Some(spec) = &manifest.countdown {
        let mut countdown = Countdown::new(spec.seconds);
        countdown.warning_fraction = spec.warning_fraction;
        engine = engine.with_countdown(countdown);
    }

    info!(
        level = %manifest.name,
        machines = manifest.machines.len(),
        lights = manifest.lights.len(),
        "level spawned"
    );
    Ok(engine)
}
