//! Game engine - owns the world and drives one tick of gameplay.
//!
//! Tick order matters and is fixed: interaction resolves first, machines
//! advance and signal, the board consumes every signal, and only then do
//! the lights chase their (now current) targets. Oxygen, dialogue, the
//! stalker, and the countdown follow. Everything runs on one thread
//! inside [`GameEngine::update`].

use hecs::{Entity, World};
use tracing::{info, warn};

use adrift_logic::countdown::Countdown;

use crate::components::{ExitGate, OxygenSupply, Player, Transform, Vec3};
use crate::events::WorldEvent;
use crate::hud::HudModel;
use crate::interaction::InteractionResponse;
use crate::raycast::{ConeRaycaster, Raycaster};
use crate::systems::{
    fixing_system, lighting_system, oxygen_system, stalker_system, DialogueSequencer,
    InteractionTracker, MachineSignal, PuzzleBoard, TaggedResponse, ViewPoint,
};

pub struct GameEngine {
    /// ECS world containing all entities
    pub world: World,
    /// Widget state the host renders
    pub hud: HudModel,
    board: PuzzleBoard,
    tracker: InteractionTracker,
    dialogue: Option<DialogueSequencer>,
    countdown: Option<Countdown>,
    caster: Box<dyn Raycaster>,
    player: Entity,
    play_time: f64,
    /// Host-facing events queued this frame
    events: Vec<WorldEvent>,
    // Scratch buffers reused across ticks
    signals: Vec<MachineSignal>,
    responses: Vec<TaggedResponse>,
}

impl GameEngine {
    /// Assemble an engine around a spawned world. The board registers its
    /// machines and the first puzzle activates here.
    pub fn new(world: World, board: PuzzleBoard, player: Entity, interaction_range: f32) -> Self {
        let mut engine = Self {
            world,
            hud: HudModel::new(),
            board,
            tracker: InteractionTracker::new(interaction_range),
            dialogue: None,
            countdown: None,
            caster: Box::new(ConeRaycaster::default()),
            player,
            play_time: 0.0,
            events: Vec::new(),
            signals: Vec::new(),
            responses: Vec::new(),
        };
        engine.board.register_machines(&engine.world);
        engine.board.activate_next_puzzle(&mut engine.hud);
        engine
    }

    pub fn with_dialogue(mut self, dialogue: DialogueSequencer) -> Self {
        self.dialogue = Some(dialogue);
        self
    }

    pub fn with_countdown(mut self, countdown: Countdown) -> Self {
        self.countdown = Some(countdown);
        self
    }

    /// Swap in the host's raycast implementation.
    pub fn with_raycaster(mut self, caster: Box<dyn Raycaster>) -> Self {
        self.caster = caster;
        self
    }

    /// Advance the whole game by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let view = self.player_view();

        // 1. Targeting and held interaction.
        let mut responses = std::mem::take(&mut self.responses);
        self.tracker.tick(
            &self.world,
            self.caster.as_ref(),
            self.player,
            view,
            &mut self.hud,
            &mut responses,
        );
        self.apply_responses(&mut responses);
        self.responses = responses;

        // 2. Machines advance and report.
        let mut signals = std::mem::take(&mut self.signals);
        fixing_system(&mut self.world, dt, &mut signals);

        // 3. The board consumes this tick's signals before any light moves.
        for signal in signals.drain(..) {
            self.board.handle_signal(signal, &mut self.hud, &mut self.events);
        }
        self.signals = signals;
        self.unlock_gates_if_ready();

        // 4. Lights chase their targets.
        lighting_system(&mut self.world, &mut self.board, dt);

        // 5. Survival and ambience.
        oxygen_system(&mut self.world, dt, &mut self.hud, &mut self.events);
        if let Some(dialogue) = &mut self.dialogue {
            dialogue.tick(dt, &mut self.hud, &mut self.events);
        }
        stalker_system(&mut self.world, view, dt, &mut self.events);
        self.tick_countdown(dt);

        self.play_time += dt as f64;
    }

    /// The interact input went down.
    pub fn begin_interact(&mut self) {
        let mut responses = std::mem::take(&mut self.responses);
        self.tracker
            .begin_interact(&self.world, self.player, &mut responses);
        self.apply_responses(&mut responses);
        self.responses = responses;
    }

    /// The interact input went up.
    pub fn end_interact(&mut self) {
        let mut responses = std::mem::take(&mut self.responses);
        self.tracker.end_interact(&self.world, &mut responses);
        self.apply_responses(&mut responses);
        self.responses = responses;
    }

    /// Dialogue advance input (skip or next line).
    pub fn advance_dialogue(&mut self) {
        if let Some(dialogue) = &mut self.dialogue {
            dialogue.advance(&mut self.hud, &mut self.events);
        }
    }

    /// Move the player's eye; the host calls this as the camera moves.
    pub fn set_view(&mut self, position: Vec3, forward: Vec3) {
        match self.world.get::<&mut Transform>(self.player) {
            Ok(mut transform) => *transform = Transform::looking(position, forward),
            Err(_) => warn!("player entity has no transform"),
        }
    }

    /// Events queued since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn board(&self) -> &PuzzleBoard {
        &self.board
    }

    pub fn global_progression(&self) -> f32 {
        self.board.global_progression()
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn play_time(&self) -> f64 {
        self.play_time
    }

    pub fn highlighted(&self) -> Option<Entity> {
        self.tracker.current()
    }

    /// Save the complete game state to a writer.
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_game(
            writer,
            &self.world,
            self.play_time,
            &self.board,
            self.dialogue.as_ref(),
            self.countdown.as_ref(),
        )
    }

    /// Load game state from a reader, replacing the current world.
    pub fn load<R: std::io::Read>(
        &mut self,
        reader: R,
    ) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_game(reader)?;

        self.world = loaded.world;
        self.play_time = loaded.play_time;
        self.board = loaded.board;
        self.dialogue = loaded.dialogue;
        self.countdown = loaded.countdown;

        self.player = self
            .world
            .query::<&Player>()
            .iter()
            .next()
            .map(|(entity, _)| entity)
            .unwrap_or(self.player);
        self.board.relink(&self.world);

        // Highlight state is transient; the next tick re-establishes it.
        self.tracker = InteractionTracker::new(self.tracker.range);
        Ok(())
    }

    fn player_view(&self) -> ViewPoint {
        match self.world.get::<&Transform>(self.player) {
            Ok(transform) => ViewPoint {
                origin: transform.position,
                forward: transform.forward,
            },
            Err(_) => ViewPoint {
                origin: Vec3::ZERO,
                forward: Vec3::FORWARD,
            },
        }
    }

    /// Turn interaction outcomes into machine signals, oxygen grants, and
    /// host events.
    fn apply_responses(&mut self, responses: &mut Vec<TaggedResponse>) {
        for (entity, response) in responses.drain(..) {
            match response {
                InteractionResponse::None => {}
                InteractionResponse::StartedFixing => {
                    self.signals.push(MachineSignal::Started(entity));
                }
                InteractionResponse::StoppedFixing => {
                    self.signals.push(MachineSignal::Stopped(entity));
                }
                InteractionResponse::ReplenishOxygen { amount } => {
                    crate::systems::grant_oxygen(&mut self.world, amount);
                    self.hud.notice.show("Oxygen replenished");
                }
                InteractionResponse::TravelRequested { destination } => {
                    info!(%destination, "level transition requested");
                    self.events.push(WorldEvent::LevelTransition { destination });
                }
                InteractionResponse::Blocked { notice } => {
                    self.hud.notice.show(notice);
                }
            }
        }
    }

    /// Once the board announces completion, every gate opens.
    fn unlock_gates_if_ready(&mut self) {
        if !self.board.is_all_fixed() {
            return;
        }
        for (_, gate) in self.world.query_mut::<&mut ExitGate>() {
            if !gate.unlocked {
                gate.unlocked = true;
                info!("exit gate unlocked");
            }
        }
    }

    fn tick_countdown(&mut self, dt: f32) {
        let Some(countdown) = &mut self.countdown else {
            self.hud.timer.hide();
            return;
        };
        countdown.tick(dt);
        let tint = if countdown.is_warning() {
            adrift_logic::color::LinearColor::RED
        } else {
            adrift_logic::color::LinearColor::WHITE
        };
        self.hud.timer.show_tinted(countdown.format(false), tint);
    }

    /// The player's remaining oxygen fraction, if a supply exists.
    pub fn oxygen_fraction(&self) -> Option<f32> {
        self.world
            .get::<&OxygenSupply>(self.player)
            .ok()
            .map(|supply| supply.meter.fraction())
    }
}
