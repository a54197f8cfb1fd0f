//! Machine repair progression.
//!
//! Advances every machine's repair state each tick and relays what
//! happened to the puzzle board as signals. Signals carry the machine
//! entity explicitly — the board never has to guess which machine is
//! reporting.

use hecs::{Entity, World};

use adrift_logic::fixing::FixTick;

use crate::components::Machine;

/// Notification from a machine to the puzzle coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MachineSignal {
    /// Repair started (interact went down on a broken machine).
    Started(Entity),
    /// Repair stopped before completion (interact released or aim lost).
    Stopped(Entity),
    /// Progress moved; value is normalized [0, 1].
    Progress { machine: Entity, progress: f32 },
    /// Repair finished. Emitted at most once per machine.
    Fixed(Entity),
}

/// Advance all machines by `dt`, queueing signals for the board.
pub fn fixing_system(world: &mut World, dt: f32, signals: &mut Vec<MachineSignal>) {
    for (entity, machine) in world.query_mut::<&mut Machine>() {
        match machine.state.advance(dt, machine.time_to_fix, machine.release) {
            FixTick::Idle => {}
            FixTick::Progressed => signals.push(MachineSignal::Progress {
                machine: entity,
                progress: machine.state.progress,
            }),
            FixTick::Completed => {
                signals.push(MachineSignal::Progress {
                    machine: entity,
                    progress: 1.0,
                });
                signals.push(MachineSignal::Fixed(entity));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrift_logic::fixing::ReleasePolicy;

    #[test]
    fn test_idle_machines_stay_silent() {
        let mut world = World::new();
        world.spawn((Machine::new(0, 3.0),));

        let mut signals = Vec::new();
        fixing_system(&mut world, 0.1, &mut signals);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_fixed_signal_fires_once() {
        let mut world = World::new();
        let entity = world.spawn((Machine::new(0, 1.0),));
        world
            .get::<&mut Machine>(entity)
            .unwrap()
            .state
            .begin();

        let mut signals = Vec::new();
        for _ in 0..30 {
            fixing_system(&mut world, 0.1, &mut signals);
        }

        let fixed_count = signals
            .iter()
            .filter(|s| matches!(s, MachineSignal::Fixed(_)))
            .count();
        assert_eq!(fixed_count, 1);

        let final_progress = signals.iter().rev().find_map(|s| match s {
            MachineSignal::Progress { progress, .. } => Some(*progress),
            _ => None,
        });
        assert_eq!(final_progress, Some(1.0));
    }

    #[test]
    fn test_decay_reports_progress_with_entity() {
        let mut world = World::new();
        let entity = world.spawn((Machine::new(0, 2.0)
            .with_release(ReleasePolicy::Decay { rate: 1.0 }),));
        {
            let mut machine = world.get::<&mut Machine>(entity).unwrap();
            machine.state.begin();
            let release = machine.release;
            machine.state.advance(1.0, 2.0, release);
            machine.state.release();
        }

        let mut signals = Vec::new();
        fixing_system(&mut world, 0.1, &mut signals);
        match signals.as_slice() {
            [MachineSignal::Progress { machine, progress }] => {
                assert_eq!(*machine, entity);
                assert!(*progress < 0.5);
            }
            other => panic!("unexpected signals: {:?}", other),
        }
    }
}
