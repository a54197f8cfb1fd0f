//! Save/Load functionality for persisting game state
//!
//! Uses bincode for efficient binary serialization of the whole game.
//! Components are serialized individually then reconstructed on load;
//! entity references inside the board are re-linked through stable ids
//! afterward.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use adrift_logic::countdown::Countdown;

use crate::components::*;
use crate::systems::{DialogueSequencer, PuzzleBoard};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the game state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Seconds of play
    pub play_time: f64,
    /// The puzzle board (entity refs dropped, re-linked on load)
    pub board: PuzzleBoard,
    /// Dialogue mid-sequence state
    pub dialogue: Option<DialogueSequencer>,
    /// Countdown state
    pub countdown: Option<Countdown>,
    /// All entities with their components
    pub entities: Vec<SerializableEntity>,
}

/// All possible components for an entity, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    pub transform: Option<Transform>,
    pub name: Option<Name>,

    // Player
    pub player: Option<Player>,
    pub oxygen_supply: Option<OxygenSupply>,

    // Station
    pub machine: Option<Machine>,
    pub spot_lamp: Option<SpotLamp>,
    pub canister: Option<OxygenCanister>,
    pub gate: Option<ExitGate>,
    pub stalker: Option<StalkerStatue>,
}

/// Extract all entities from a world into serializable form
fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    let mut entities = Vec::new();

    for entity in world.iter() {
        let mut se = SerializableEntity::default();
        let entity_ref = world.entity(entity.entity()).unwrap();

        if let Some(c) = entity_ref.get::<&Transform>() {
            se.transform = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Name>() {
            se.name = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Player>() {
            se.player = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&OxygenSupply>() {
            se.oxygen_supply = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Machine>() {
            se.machine = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&SpotLamp>() {
            se.spot_lamp = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&OxygenCanister>() {
            se.canister = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&ExitGate>() {
            se.gate = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&StalkerStatue>() {
            se.stalker = Some((*c).clone());
        }

        entities.push(se);
    }

    entities
}

/// Rebuild a world from serialized entities
fn deserialize_entities(world: &mut World, entities: Vec<SerializableEntity>) {
    for se in entities {
        spawn_entity(world, se);
    }
}

/// Spawn an entity with all its components
fn spawn_entity(world: &mut World, se: SerializableEntity) {
    let entity = world.spawn(());

    if let Some(c) = se.transform {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.name {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.player {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.oxygen_supply {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.machine {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.spot_lamp {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.canister {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.gate {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.stalker {
        let _ = world.insert_one(entity, c);
    }
}

/// Save the complete game to a writer
pub fn save_game<W: Write>(
    writer: W,
    world: &World,
    play_time: f64,
    board: &PuzzleBoard,
    dialogue: Option<&DialogueSequencer>,
    countdown: Option<&Countdown>,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        play_time,
        board: board.clone(),
        dialogue: dialogue.cloned(),
        countdown: countdown.copied(),
        entities: serialize_entities(world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a game from a reader
pub fn load_game<R: Read>(reader: R) -> Result<LoadedGame, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    deserialize_entities(&mut world, save_data.entities);

    Ok(LoadedGame {
        world,
        play_time: save_data.play_time,
        board: save_data.board,
        dialogue: save_data.dialogue,
        countdown: save_data.countdown,
    })
}

/// Result of loading a game
pub struct LoadedGame {
    pub world: World,
    pub play_time: f64,
    pub board: PuzzleBoard,
    pub dialogue: Option<DialogueSequencer>,
    pub countdown: Option<Countdown>,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{load_manifest, spawn_level};

    const LEVEL: &str = r#"{
        "name": "Roundtrip Deck",
        "player": { "position": [0, 0, 0], "oxygen": { "max": 100, "drain_rate": 1.0 } },
        "machines": [
            { "name": "Generator", "position": [3, 0, 0], "time_to_fix": 1.0, "order": 0,
              "objective": "Power", "task": "Fix the generator" },
            { "name": "Recycler", "position": [0, 3, 0], "time_to_fix": 1.0, "order": 1,
              "objective": "Air", "task": "Fix the recycler" }
        ],
        "lights": [ { "name": "Bay Lamp", "machine": "Generator" } ]
    }"#;

    #[test]
    fn test_save_load_roundtrip() {
        let manifest = load_manifest(LEVEL).unwrap();
        let mut engine = spawn_level(&manifest).unwrap();

        // Fix the first machine and run a bit.
        engine.set_view(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        engine.update(0.016);
        engine.begin_interact();
        for _ in 0..80 {
            engine.update(0.016);
        }
        let original_time = engine.play_time();
        let original_global = engine.global_progression();
        assert_eq!(original_global, 50.0);

        // Save
        let mut save_buffer = Vec::new();
        engine.save(&mut save_buffer).expect("Save failed");

        // Load into a fresh engine
        let mut loaded = spawn_level(&manifest).unwrap();
        loaded.load(&save_buffer[..]).expect("Load failed");

        assert!((loaded.play_time() - original_time).abs() < 0.001);
        assert_eq!(loaded.global_progression(), original_global);

        // Machine phases survived.
        let fixed_count = loaded
            .world
            .query::<&Machine>()
            .iter()
            .filter(|(_, m)| m.is_fixed())
            .count();
        assert_eq!(fixed_count, 1);

        // Board references resolve again: fixing the second machine
        // completes the level.
        loaded.set_view(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        loaded.update(0.016);
        loaded.begin_interact();
        for _ in 0..80 {
            loaded.update(0.016);
        }
        assert_eq!(loaded.global_progression(), 100.0);
        assert!(loaded
            .drain_events()
            .contains(&crate::events::WorldEvent::AllMachinesFixed));
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let manifest = load_manifest(LEVEL).unwrap();
        let engine = spawn_level(&manifest).unwrap();

        let mut buffer = Vec::new();
        engine.save(&mut buffer).unwrap();

        // Corrupt the version field (first 4 bytes, little-endian u32).
        buffer[0] = 99;
        match load_game(&buffer[..]) {
            Err(SaveError::VersionMismatch { found: 99, .. }) => {}
            other => panic!("expected version mismatch, got {:?}", other.err()),
        }
    }
}
