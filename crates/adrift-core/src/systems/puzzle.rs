//! The puzzle board: ordered repair objectives, aggregate completion, and
//! light feedback targets.
//!
//! The board owns its entries and light bindings outright. Machines are
//! referenced, never owned, and every notification names its machine, so
//! there is no ambient "current machine" anywhere in here. Lights bind to
//! entries by stable [`PuzzleId`] and are resolved through a lookup table,
//! which survives the initial sort and any future reshuffling.
//!
//! All tick-path operations degrade silently on missing references; a
//! dropped machine or lamp must never halt the simulation.

use std::collections::HashMap;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use adrift_logic::color::LinearColor;
use adrift_logic::lighting::{LightRamp, TransitionMode};
use adrift_logic::progression::{self, EntryState};

use crate::components::{Machine, PuzzleId};
use crate::events::WorldEvent;
use crate::hud::HudModel;
use crate::systems::fixing::MachineSignal;

/// One repair objective on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleEntry {
    pub id: PuzzleId,
    /// The machine this entry tracks. Dropped from saves and re-linked
    /// through `machine_id`.
    #[serde(skip)]
    pub machine: Option<Entity>,
    pub machine_id: u32,
    /// Completion percentage in [0, 100].
    pub completion: f32,
    /// Designer-assigned ordering; lower goes first.
    pub order: i32,
    pub completed: bool,
    pub active: bool,
    pub objective: String,
    pub task: String,
}

impl PuzzleEntry {
    pub fn new(id: PuzzleId, machine: Entity, machine_id: u32, order: i32) -> Self {
        Self {
            id,
            machine: Some(machine),
            machine_id,
            completion: 0.0,
            order,
            completed: false,
            active: false,
            objective: String::new(),
            task: String::new(),
        }
    }

    pub fn with_text(mut self, objective: impl Into<String>, task: impl Into<String>) -> Self {
        self.objective = objective.into();
        self.task = task.into();
        self
    }

    fn state(&self) -> EntryState {
        EntryState {
            order: self.order,
            completed: self.completed,
            active: self.active,
        }
    }
}

/// A scene light following one entry's completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightBinding {
    /// The lamp this binding drives. Dropped from saves and re-linked
    /// through `light_id`.
    #[serde(skip)]
    pub light: Option<Entity>,
    pub light_id: u32,
    pub puzzle: PuzzleId,
    pub ramp: LightRamp,
    pub current_color: LinearColor,
    pub current_intensity: f32,
    pub target_color: LinearColor,
    pub target_intensity: f32,
}

impl LightBinding {
    pub fn new(light: Entity, light_id: u32, puzzle: PuzzleId, ramp: LightRamp) -> Self {
        Self {
            light: Some(light),
            light_id,
            puzzle,
            ramp,
            current_color: ramp.start_color,
            current_intensity: ramp.start_intensity,
            target_color: ramp.start_color,
            target_intensity: ramp.start_intensity,
        }
    }
}

/// Coordinates every repair objective in the level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleBoard {
    entries: Vec<PuzzleEntry>,
    lights: Vec<LightBinding>,
    transition: TransitionMode,
    /// Index of the entry currently driving the HUD objective.
    current: Option<usize>,
    global_pct: f32,
    all_fixed_announced: bool,
    #[serde(skip)]
    index_by_id: HashMap<PuzzleId, usize>,
}

impl PuzzleBoard {
    /// Build the board. Entries are stable-sorted by `order` once, here;
    /// ties keep their configured relative position.
    pub fn new(
        mut entries: Vec<PuzzleEntry>,
        lights: Vec<LightBinding>,
        transition: TransitionMode,
    ) -> Self {
        entries.sort_by_key(|e| e.order);
        let mut board = Self {
            entries,
            lights,
            transition,
            current: None,
            global_pct: 0.0,
            all_fixed_announced: false,
            index_by_id: HashMap::new(),
        };
        board.rebuild_index();
        board.recompute_global();
        board
    }

    /// Stamp every entry's machine with a back-reference to its entry.
    pub fn register_machines(&self, world: &World) {
        for entry in &self.entries {
            let Some(machine) = entry.machine else {
                warn!(puzzle = entry.id.0, "entry has no machine to register");
                continue;
            };
            match world.get::<&mut Machine>(machine) {
                Ok(mut m) => m.puzzle = Some(entry.id),
                Err(_) => warn!(puzzle = entry.id.0, "machine entity is gone"),
            }
        }
    }

    /// Route one machine signal into the board.
    pub fn handle_signal(
        &mut self,
        signal: MachineSignal,
        hud: &mut HudModel,
        events: &mut Vec<WorldEvent>,
    ) {
        match signal {
            MachineSignal::Started(machine) => self.on_machine_started(machine, hud),
            MachineSignal::Stopped(machine) => self.on_machine_stopped(machine, hud),
            MachineSignal::Progress { machine, progress } => {
                self.update_progress(machine, progress, hud)
            }
            MachineSignal::Fixed(machine) => self.on_machine_fixed(machine, hud, events),
        }
    }

    /// Activate the first entry that is neither completed nor active.
    /// Exactly one entry activates per call; returns its id.
    pub fn activate_next_puzzle(&mut self, hud: &mut HudModel) -> Option<PuzzleId> {
        let states: Vec<EntryState> = self.entries.iter().map(|e| e.state()).collect();
        let index = progression::next_activation(&states)?;

        let entry = &mut self.entries[index];
        entry.active = true;
        self.current = Some(index);
        hud.set_objective(entry.objective.clone(), entry.task.clone());
        info!(puzzle = entry.id.0, order = entry.order, "puzzle activated");
        Some(entry.id)
    }

    fn on_machine_started(&mut self, machine: Entity, hud: &mut HudModel) {
        let Some(index) = self.entry_for_machine(machine) else {
            warn!(?machine, "start signal from unregistered machine");
            return;
        };
        debug!(puzzle = self.entries[index].id.0, "machine started fixing");
        hud.progress_bar.show(self.entries[index].completion / 100.0);
    }

    fn on_machine_stopped(&mut self, machine: Entity, hud: &mut HudModel) {
        if self.entry_for_machine(machine).is_none() {
            warn!(?machine, "stop signal from unregistered machine");
            return;
        }
        debug!(?machine, "machine stopped fixing");
        hud.progress_bar.hide();
    }

    /// Record new progress for the named machine's entry and retarget its
    /// light. `progress` is normalized [0, 1].
    pub fn update_progress(&mut self, machine: Entity, progress: f32, hud: &mut HudModel) {
        let Some(index) = self.entry_for_machine(machine) else {
            warn!(?machine, "progress from unregistered machine");
            return;
        };
        let entry = &mut self.entries[index];
        if entry.completed {
            return;
        }
        entry.completion = (progress * 100.0).clamp(0.0, 100.0);
        let id = entry.id;
        let pct = entry.completion;

        hud.progress_bar.show(progress.clamp(0.0, 1.0));
        self.set_light_targets(id, pct);
        self.recompute_global();
    }

    /// A machine finished. Idempotent: a second notification for the same
    /// machine is a no-op because its entry is already completed.
    pub fn on_machine_fixed(
        &mut self,
        machine: Entity,
        hud: &mut HudModel,
        events: &mut Vec<WorldEvent>,
    ) {
        let Some(index) = self.entry_for_machine(machine) else {
            warn!(?machine, "fixed signal from unregistered machine");
            return;
        };
        if self.entries[index].completed {
            return;
        }

        let (id, order) = {
            let entry = &mut self.entries[index];
            entry.completion = 100.0;
            entry.completed = true;
            entry.active = false;
            (entry.id, entry.order)
        };
        info!(puzzle = id.0, order, "machine fixed");

        hud.progress_bar.hide();
        self.set_light_targets(id, 100.0);
        self.activate_next_puzzle(hud);
        self.recompute_global();

        let states: Vec<EntryState> = self.entries.iter().map(|e| e.state()).collect();
        if !self.entries.is_empty()
            && progression::all_complete(&states)
            && !self.all_fixed_announced
        {
            self.all_fixed_announced = true;
            hud.notice.show("All machines operational");
            hud.task.hide();
            events.push(WorldEvent::AllMachinesFixed);
            info!("all machines fixed");
        }
    }

    /// Aggregate completion: the arithmetic mean of entry percentages.
    pub fn global_progression(&self) -> f32 {
        self.global_pct
    }

    pub fn completion_of(&self, id: PuzzleId) -> Option<f32> {
        self.index_by_id
            .get(&id)
            .map(|&i| self.entries[i].completion)
    }

    pub fn is_all_fixed(&self) -> bool {
        self.all_fixed_announced
    }

    pub fn current_puzzle(&self) -> Option<PuzzleId> {
        self.current.map(|i| self.entries[i].id)
    }

    pub fn entries(&self) -> &[PuzzleEntry] {
        &self.entries
    }

    pub fn transition(&self) -> TransitionMode {
        self.transition
    }

    pub fn lights_mut(&mut self) -> &mut [LightBinding] {
        &mut self.lights
    }

    /// Re-resolve entity references from stable ids after a load, and
    /// re-stamp machine back-references.
    pub fn relink(&mut self, world: &World) {
        let mut machines: HashMap<u32, Entity> = HashMap::new();
        for (entity, machine) in world.query::<&Machine>().iter() {
            machines.insert(machine.id, entity);
        }
        let mut lamps: HashMap<u32, Entity> = HashMap::new();
        for (entity, lamp) in world.query::<&crate::components::SpotLamp>().iter() {
            lamps.insert(lamp.id, entity);
        }

        for entry in &mut self.entries {
            entry.machine = machines.get(&entry.machine_id).copied();
            if entry.machine.is_none() {
                warn!(machine_id = entry.machine_id, "no machine found to relink");
            }
        }
        for binding in &mut self.lights {
            binding.light = lamps.get(&binding.light_id).copied();
            if binding.light.is_none() {
                warn!(light_id = binding.light_id, "no lamp found to relink");
            }
        }

        self.rebuild_index();
        self.register_machines(world);
    }

    fn entry_for_machine(&self, machine: Entity) -> Option<usize> {
        self.entries.iter().position(|e| e.machine == Some(machine))
    }

    /// Point every binding for this entry at the ramp position for `pct`.
    /// Unknown ids are ignored; not every entry has a light.
    fn set_light_targets(&mut self, id: PuzzleId, pct: f32) {
        for binding in self.lights.iter_mut().filter(|b| b.puzzle == id) {
            let (color, intensity) = binding.ramp.target(pct);
            binding.target_color = color;
            binding.target_intensity = intensity;
        }
    }

    fn recompute_global(&mut self) {
        let percentages: Vec<f32> = self.entries.iter().map(|e| e.completion).collect();
        self.global_pct = progression::mean_completion(&percentages);
    }

    fn rebuild_index(&mut self) {
        self.index_by_id = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrift_logic::lighting::TransitionMode;

    struct Fixture {
        world: World,
        board: PuzzleBoard,
        hud: HudModel,
        events: Vec<WorldEvent>,
        machines: Vec<Entity>,
    }

    /// Three machines configured out of order, one light on the first.
    fn fixture() -> Fixture {
        let mut world = World::new();
        let machines: Vec<Entity> = (0..3u32)
            .map(|id| world.spawn((Machine::new(id, 2.0),)))
            .collect();
        let lamp = world.spawn((crate::components::SpotLamp::new(0),));

        let entries = vec![
            PuzzleEntry::new(PuzzleId(2), machines[2], 2, 30).with_text("Vents", "Clear the vents"),
            PuzzleEntry::new(PuzzleId(0), machines[0], 0, 10)
                .with_text("Power", "Restore main power"),
            PuzzleEntry::new(PuzzleId(1), machines[1], 1, 20).with_text("Pumps", "Prime the pumps"),
        ];
        let lights = vec![LightBinding::new(
            lamp,
            0,
            PuzzleId(0),
            LightRamp::default(),
        )];

        let board = PuzzleBoard::new(entries, lights, TransitionMode::Immediate);
        board.register_machines(&world);

        Fixture {
            world,
            board,
            hud: HudModel::new(),
            events: Vec::new(),
            machines,
        }
    }

    #[test]
    fn test_entries_sorted_and_registered() {
        let f = fixture();
        let orders: Vec<i32> = f.board.entries().iter().map(|e| e.order).collect();
        assert_eq!(orders, [10, 20, 30]);

        for (i, &machine) in f.machines.iter().enumerate() {
            let m = f.world.get::<&Machine>(machine).unwrap();
            assert_eq!(m.puzzle, Some(PuzzleId(i as u32)));
        }
    }

    #[test]
    fn test_activation_is_one_per_call() {
        let mut f = fixture();
        let first = f.board.activate_next_puzzle(&mut f.hud);
        assert_eq!(first, Some(PuzzleId(0)));
        assert_eq!(f.hud.objective.text, "Power");
        assert_eq!(f.hud.task.text, "Restore main power");

        let active: Vec<bool> = f.board.entries().iter().map(|e| e.active).collect();
        assert_eq!(active, [true, false, false]);
    }

    #[test]
    fn test_activation_skips_completed_and_active() {
        let mut f = fixture();
        f.board.activate_next_puzzle(&mut f.hud);
        f.board
            .on_machine_fixed(f.machines[0], &mut f.hud, &mut f.events);

        // Fixing the first entry auto-activated the second; only it.
        let entries = f.board.entries();
        assert!(entries[0].completed);
        assert!(entries[1].active);
        assert!(!entries[2].active);
        assert_eq!(f.hud.objective.text, "Pumps");
    }

    #[test]
    fn test_progress_updates_entry_light_and_global() {
        let mut f = fixture();
        f.board
            .update_progress(f.machines[0], 0.5, &mut f.hud);

        assert_eq!(f.board.completion_of(PuzzleId(0)), Some(50.0));
        assert!((f.board.global_progression() - 50.0 / 3.0).abs() < 1e-4);
        assert!(f.hud.progress_bar.visible);
        assert_eq!(f.hud.progress_bar.fraction, 0.5);

        let binding = &f.board.lights_mut()[0];
        assert!((binding.target_intensity - 1500.0).abs() < 1.0);
    }

    #[test]
    fn test_global_is_mean_of_entries() {
        let mut f = fixture();
        f.board.update_progress(f.machines[1], 0.5, &mut f.hud);
        f.board
            .on_machine_fixed(f.machines[2], &mut f.hud, &mut f.events);
        // {0, 50, 100} → 50
        assert_eq!(f.board.global_progression(), 50.0);
    }

    #[test]
    fn test_double_fixed_is_idempotent() {
        let mut f = fixture();
        f.board
            .on_machine_fixed(f.machines[0], &mut f.hud, &mut f.events);
        let after_first = f.board.global_progression();

        f.board
            .on_machine_fixed(f.machines[0], &mut f.hud, &mut f.events);
        assert_eq!(f.board.global_progression(), after_first);
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_all_fixed_fires_once() {
        let mut f = fixture();
        for &machine in &f.machines {
            f.board.on_machine_fixed(machine, &mut f.hud, &mut f.events);
        }
        assert_eq!(f.events, vec![WorldEvent::AllMachinesFixed]);
        assert!(f.board.is_all_fixed());
        assert_eq!(f.board.global_progression(), 100.0);

        // Late duplicate must not re-announce.
        f.board
            .on_machine_fixed(f.machines[0], &mut f.hud, &mut f.events);
        assert_eq!(f.events.len(), 1);
    }

    #[test]
    fn test_signals_from_unknown_machine_are_ignored() {
        let mut f = fixture();
        let stray = f.world.spawn((Machine::new(99, 1.0),));

        f.board.update_progress(stray, 0.8, &mut f.hud);
        f.board.on_machine_fixed(stray, &mut f.hud, &mut f.events);

        assert_eq!(f.board.global_progression(), 0.0);
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_fixed_pushes_light_to_end_state() {
        let mut f = fixture();
        f.board
            .on_machine_fixed(f.machines[0], &mut f.hud, &mut f.events);
        let binding = &f.board.lights_mut()[0];
        assert_eq!(binding.target_intensity, 3000.0);
        assert!(binding
            .target_color
            .max_component_delta(LinearColor::GREEN) < 1e-4);
    }

    #[test]
    fn test_stable_sort_keeps_equal_orders_in_config_sequence() {
        let mut world = World::new();
        let a = world.spawn((Machine::new(0, 1.0),));
        let b = world.spawn((Machine::new(1, 1.0),));
        let entries = vec![
            PuzzleEntry::new(PuzzleId(0), a, 0, 5).with_text("first", ""),
            PuzzleEntry::new(PuzzleId(1), b, 1, 5).with_text("second", ""),
        ];
        let board = PuzzleBoard::new(entries, Vec::new(), TransitionMode::Immediate);
        let names: Vec<&str> = board
            .entries()
            .iter()
            .map(|e| e.objective.as_str())
            .collect();
        assert_eq!(names, ["first", "second"]);
    }
}
