//! The interactable capability contract.
//!
//! Any world object the player can target implements [`Interactable`]. The
//! raycast layer never learns concrete types; it holds the hit entity and
//! dispatches through [`with_interactable`], which resolves the entity to
//! `&mut dyn Interactable` over the closed set of interactable components.

use hecs::{Entity, World};

/// What an interaction did. The engine applies these against the world
/// (topping up oxygen, raising events) so component impls stay pure.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionResponse {
    /// Nothing happened.
    None,
    /// A machine moved from Broken to BeingFixed.
    StartedFixing,
    /// A machine moved from BeingFixed back to Broken.
    StoppedFixing,
    /// Grant the interactor this much oxygen.
    ReplenishOxygen { amount: f32 },
    /// The exit gate accepted; the host should change levels.
    TravelRequested { destination: String },
    /// The target refused and wants this notice shown.
    Blocked { notice: String },
}

/// Capability contract for objects the player can target and act on.
///
/// Highlight calls must be idempotent: applying the same highlight state
/// twice in a row has no further effect.
pub trait Interactable {
    /// The player's aim settled on this object.
    fn on_highlight(&mut self);

    /// The player's aim left this object.
    fn on_unhighlight(&mut self);

    /// The player pressed (or is holding) interact on this object. Called
    /// every tick while held; the implementation decides whether that is
    /// continuous or one-shot behavior.
    fn interact(&mut self, interactor: Entity) -> InteractionResponse;

    /// The player released interact while this object was targeted. Only
    /// objects with a stop semantic override this.
    fn interact_released(&mut self) -> InteractionResponse {
        InteractionResponse::None
    }

    /// Whether the object accepts highlighting and interaction right now.
    fn can_interact(&self) -> bool;

    /// Prompt text for the HUD, reflecting current state. `None` hides
    /// the prompt.
    fn interaction_text(&self) -> Option<String>;
}

macro_rules! dispatch_interactable {
    ($world:expr, $entity:expr, $f:expr, [$($component:ty),+ $(,)?]) => {{
        $(
            if let Ok(mut c) = $world.get::<&mut $component>($entity) {
                return Some($f(&mut *c));
            }
        )+
        None
    }};
}

/// Run `f` against the entity's interactable capability, if it has one.
pub fn with_interactable<R>(
    world: &World,
    entity: Entity,
    f: impl FnOnce(&mut dyn Interactable) -> R,
) -> Option<R> {
    use crate::components::{ExitGate, Machine, OxygenCanister};
    dispatch_interactable!(world, entity, f, [Machine, OxygenCanister, ExitGate])
}

/// Whether the entity carries any interactable component at all. Does not
/// consult `can_interact`; the raycast layer checks that separately.
pub fn is_interactable(world: &World, entity: Entity) -> bool {
    with_interactable(world, entity, |_| ()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ExitGate, Machine, OxygenCanister, Transform, Vec3};

    #[test]
    fn test_dispatch_reaches_each_component_kind() {
        let mut world = World::new();
        let machine = world.spawn((Machine::new(0, 3.0),));
        let canister = world.spawn((OxygenCanister::new(25.0),));
        let gate = world.spawn((ExitGate::new("hub"),));
        let scenery = world.spawn((Transform::at(Vec3::ZERO),));

        for entity in [machine, canister, gate] {
            assert!(is_interactable(&world, entity));
            let text = with_interactable(&world, entity, |i| i.interaction_text()).unwrap();
            assert!(text.is_some());
        }
        assert!(!is_interactable(&world, scenery));
    }

    #[test]
    fn test_dispatch_mutates_through_the_trait() {
        let mut world = World::new();
        let entity = world.spawn((Machine::new(0, 3.0),));

        with_interactable(&world, entity, |i| i.on_highlight());
        assert!(world.get::<&Machine>(entity).unwrap().highlighted);

        with_interactable(&world, entity, |i| i.on_unhighlight());
        assert!(!world.get::<&Machine>(entity).unwrap().highlighted);
    }

    #[test]
    fn test_dispatch_on_missing_entity_is_none() {
        let mut world = World::new();
        let entity = world.spawn(());
        world.despawn(entity).unwrap();
        assert!(with_interactable(&world, entity, |_| ()).is_none());
    }
}
