//! Station-side components: machines, lamps, canisters, the exit gate,
//! and the stalker hazard.

use adrift_logic::color::LinearColor;
use adrift_logic::fixing::{FixState, ReleasePolicy};
use serde::{Deserialize, Serialize};

use hecs::Entity;

use crate::interaction::{Interactable, InteractionResponse};

/// Stable identifier for a puzzle entry. Survives sorting and saves; never
/// a positional index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PuzzleId(pub u32);

/// A broken machine the player can repair by holding interact on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    /// Stable per-level id, used to re-link board references after a load.
    pub id: u32,
    pub state: FixState,
    /// Seconds of held interaction needed for a full repair.
    pub time_to_fix: f32,
    pub release: ReleasePolicy,
    pub prompt: String,
    /// Back-reference stamped by the coordinator at registration.
    pub puzzle: Option<PuzzleId>,
    pub highlighted: bool,
}

impl Machine {
    pub fn new(id: u32, time_to_fix: f32) -> Self {
        Self {
            id,
            state: FixState::new(),
            time_to_fix,
            release: ReleasePolicy::default(),
            prompt: "Hold [E] to Fix".to_string(),
            puzzle: None,
            highlighted: false,
        }
    }

    pub fn with_release(mut self, release: ReleasePolicy) -> Self {
        self.release = release;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.state.is_fixed()
    }

    pub fn is_being_fixed(&self) -> bool {
        self.state.is_being_fixed()
    }

    pub fn progress(&self) -> f32 {
        self.state.progress
    }
}

impl Interactable for Machine {
    fn on_highlight(&mut self) {
        if !self.is_fixed() {
            self.highlighted = true;
        }
    }

    fn on_unhighlight(&mut self) {
        self.highlighted = false;
    }

    fn interact(&mut self, _interactor: Entity) -> InteractionResponse {
        if self.state.begin() {
            InteractionResponse::StartedFixing
        } else {
            InteractionResponse::None
        }
    }

    fn interact_released(&mut self) -> InteractionResponse {
        if self.state.release() {
            InteractionResponse::StoppedFixing
        } else {
            InteractionResponse::None
        }
    }

    fn can_interact(&self) -> bool {
        !self.is_fixed()
    }

    fn interaction_text(&self) -> Option<String> {
        if self.is_fixed() {
            None
        } else {
            Some(self.prompt.clone())
        }
    }
}

/// A scene light whose applied color and intensity the lighting system
/// writes each tick. The renderer reads these values verbatim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpotLamp {
    /// Stable per-level id, mirrors [`Machine::id`] for save re-linking.
    pub id: u32,
    pub color: LinearColor,
    pub intensity: f32,
}

impl SpotLamp {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            color: LinearColor::RED,
            intensity: 0.0,
        }
    }
}

/// A one-shot (or reusable) oxygen top-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OxygenCanister {
    pub amount: f32,
    pub single_use: bool,
    pub consumed: bool,
    pub prompt: String,
    pub highlighted: bool,
}

impl OxygenCanister {
    pub fn new(amount: f32) -> Self {
        Self {
            amount,
            single_use: true,
            consumed: false,
            prompt: "[E] Replenish Oxygen".to_string(),
            highlighted: false,
        }
    }
}

impl Interactable for OxygenCanister {
    fn on_highlight(&mut self) {
        if !self.consumed {
            self.highlighted = true;
        }
    }

    fn on_unhighlight(&mut self) {
        self.highlighted = false;
    }

    fn interact(&mut self, _interactor: Entity) -> InteractionResponse {
        if self.consumed {
            return InteractionResponse::None;
        }
        if self.single_use {
            self.consumed = true;
            self.highlighted = false;
        }
        InteractionResponse::ReplenishOxygen {
            amount: self.amount,
        }
    }

    fn can_interact(&self) -> bool {
        !self.consumed
    }

    fn interaction_text(&self) -> Option<String> {
        if self.consumed {
            None
        } else {
            Some(self.prompt.clone())
        }
    }
}

/// The way out. Locked until every machine is repaired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitGate {
    pub unlocked: bool,
    pub prompt: String,
    pub locked_notice: String,
    pub destination: String,
    pub highlighted: bool,
}

impl ExitGate {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            unlocked: false,
            prompt: "[E] Continue to Next Area".to_string(),
            locked_notice: "Complete all repairs first".to_string(),
            destination: destination.into(),
            highlighted: false,
        }
    }
}

impl Interactable for ExitGate {
    fn on_highlight(&mut self) {
        self.highlighted = true;
    }

    fn on_unhighlight(&mut self) {
        self.highlighted = false;
    }

    fn interact(&mut self, _interactor: Entity) -> InteractionResponse {
        if self.unlocked {
            InteractionResponse::TravelRequested {
                destination: self.destination.clone(),
            }
        } else {
            InteractionResponse::Blocked {
                notice: self.locked_notice.clone(),
            }
        }
    }

    fn can_interact(&self) -> bool {
        true
    }

    fn interaction_text(&self) -> Option<String> {
        if self.unlocked {
            Some(self.prompt.clone())
        } else {
            Some(self.locked_notice.clone())
        }
    }
}

/// Shard scatter ranges rolled when a stalker statue is shattered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShardSpec {
    pub min_shards: u32,
    pub max_shards: u32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ShardSpec {
    fn default() -> Self {
        Self {
            min_shards: 6,
            max_shards: 14,
            min_scale: 0.1,
            max_scale: 0.4,
        }
    }
}

/// A statue that closes in on the player only while nobody is looking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalkerStatue {
    /// Units per second while unobserved.
    pub speed: f32,
    /// Distance at which the statue has caught the player.
    pub reach: f32,
    /// Half-angle of the viewer cone that counts as "observed", degrees.
    pub observe_half_angle_deg: f32,
    pub broken: bool,
    pub reached: bool,
    pub shards: ShardSpec,
}

impl StalkerStatue {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            reach: 1.0,
            observe_half_angle_deg: 50.0,
            broken: false,
            reached: false,
            shards: ShardSpec::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrift_logic::fixing::MachinePhase;

    #[test]
    fn test_machine_prompt_reflects_state() {
        let mut machine = Machine::new(0, 3.0);
        assert_eq!(machine.interaction_text().as_deref(), Some("Hold [E] to Fix"));

        machine.state.begin();
        machine.state.advance(10.0, 3.0, machine.release);
        assert_eq!(machine.state.phase, MachinePhase::Fixed);
        assert!(machine.interaction_text().is_none());
        assert!(!machine.can_interact());
    }

    #[test]
    fn test_machine_highlight_is_idempotent() {
        let mut machine = Machine::new(0, 3.0);
        machine.on_highlight();
        machine.on_highlight();
        assert!(machine.highlighted);
        machine.on_unhighlight();
        assert!(!machine.highlighted);
    }

    #[test]
    fn test_fixed_machine_refuses_highlight() {
        let mut machine = Machine::new(0, 1.0);
        machine.state.begin();
        machine.state.advance(2.0, 1.0, machine.release);
        machine.on_highlight();
        assert!(!machine.highlighted);
    }

    #[test]
    fn test_canister_single_use() {
        let mut canister = OxygenCanister::new(50.0);
        assert!(matches!(
            canister.interact(Entity::DANGLING),
            InteractionResponse::ReplenishOxygen { amount } if amount == 50.0
        ));
        assert!(!canister.can_interact());
        assert!(matches!(canister.interact(Entity::DANGLING), InteractionResponse::None));
    }

    #[test]
    fn test_reusable_canister_keeps_dispensing() {
        let mut canister = OxygenCanister::new(10.0);
        canister.single_use = false;
        canister.interact(Entity::DANGLING);
        assert!(canister.can_interact());
        assert!(matches!(
            canister.interact(Entity::DANGLING),
            InteractionResponse::ReplenishOxygen { .. }
        ));
    }

    #[test]
    fn test_gate_blocks_until_unlocked() {
        let mut gate = ExitGate::new("docking_bay");
        assert!(matches!(gate.interact(Entity::DANGLING), InteractionResponse::Blocked { .. }));
        assert_eq!(
            gate.interaction_text().as_deref(),
            Some("Complete all repairs first")
        );

        gate.unlocked = true;
        assert!(matches!(
            gate.interact(Entity::DANGLING),
            InteractionResponse::TravelRequested { ref destination } if destination == "docking_bay"
        ));
        assert_eq!(
            gate.interaction_text().as_deref(),
            Some("[E] Continue to Next Area")
        );
    }
}
