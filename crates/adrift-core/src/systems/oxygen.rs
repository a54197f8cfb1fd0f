//! Oxygen survival.
//!
//! Drains the player's supply each tick, keeps the HUD readout current,
//! and announces depletion exactly once per drop to zero.

use hecs::World;
use tracing::info;

use adrift_logic::color::LinearColor;
use adrift_logic::oxygen;

use crate::components::{OxygenSupply, Player};
use crate::events::WorldEvent;
use crate::hud::HudModel;

const LOW_OXYGEN_TINT: LinearColor = LinearColor::RED;
const NORMAL_TINT: LinearColor = LinearColor::WHITE;

pub fn oxygen_system(
    world: &mut World,
    dt: f32,
    hud: &mut HudModel,
    events: &mut Vec<WorldEvent>,
) {
    for (_, (_, supply)) in world.query_mut::<(&Player, &mut OxygenSupply)>() {
        supply.meter.drain(supply.drain_rate, dt);

        let tint = if oxygen::is_low(supply.meter.fraction(), supply.low_fraction) {
            LOW_OXYGEN_TINT
        } else {
            NORMAL_TINT
        };
        hud.oxygen
            .show_tinted(format!("{}%", supply.meter.percent()), tint);

        if supply.meter.is_empty() {
            if !supply.depleted_notified {
                supply.depleted_notified = true;
                events.push(WorldEvent::OxygenDepleted);
                info!("oxygen depleted");
            }
        } else {
            supply.depleted_notified = false;
        }
    }
}

/// Top up the player's supply (canister pickup).
pub fn grant_oxygen(world: &mut World, amount: f32) {
    for (_, (_, supply)) in world.query_mut::<(&Player, &mut OxygenSupply)>() {
        supply.meter.add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Transform;

    fn spawn_player(world: &mut World, max: f32, drain: f32) {
        world.spawn((Player, Transform::default(), OxygenSupply::new(max, drain)));
    }

    #[test]
    fn test_drain_updates_hud() {
        let mut world = World::new();
        spawn_player(&mut world, 100.0, 1.0);
        let mut hud = HudModel::new();
        let mut events = Vec::new();

        oxygen_system(&mut world, 10.0, &mut hud, &mut events);
        assert_eq!(hud.oxygen.text, "90%");
        assert_eq!(hud.oxygen.color, NORMAL_TINT);
        assert!(events.is_empty());
    }

    #[test]
    fn test_low_oxygen_tints_red() {
        let mut world = World::new();
        spawn_player(&mut world, 100.0, 1.0);
        let mut hud = HudModel::new();
        let mut events = Vec::new();

        oxygen_system(&mut world, 60.0, &mut hud, &mut events);
        assert_eq!(hud.oxygen.text, "40%");
        assert_eq!(hud.oxygen.color, LOW_OXYGEN_TINT);
    }

    #[test]
    fn test_depletion_fires_once_and_rearms_on_refill() {
        let mut world = World::new();
        spawn_player(&mut world, 10.0, 1.0);
        let mut hud = HudModel::new();
        let mut events = Vec::new();

        oxygen_system(&mut world, 20.0, &mut hud, &mut events);
        oxygen_system(&mut world, 1.0, &mut hud, &mut events);
        assert_eq!(events, vec![WorldEvent::OxygenDepleted]);

        grant_oxygen(&mut world, 5.0);
        oxygen_system(&mut world, 0.1, &mut hud, &mut events);
        assert_eq!(events.len(), 1);

        // Draining to zero again re-announces.
        oxygen_system(&mut world, 20.0, &mut hud, &mut events);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_no_player_is_a_no_op() {
        let mut world = World::new();
        let mut hud = HudModel::new();
        let mut events = Vec::new();
        oxygen_system(&mut world, 1.0, &mut hud, &mut events);
        assert!(!hud.oxygen.visible);
    }
}
