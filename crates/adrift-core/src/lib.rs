//! Adrift Core - Station Repair Gameplay Engine
//!
//! The engine-independent core of a first-person puzzle game: the player
//! explores a dead station, repairs its machines by holding interact on
//! them, manages a draining oxygen supply, and escapes once everything
//! runs again. Rendering, physics traces, input, and audio live in the
//! host; this crate owns the rules.
//!
//! # Architecture
//!
//! State lives in an ECS world via `hecs`:
//! - **Entities**: the player, machines, lamps, canisters, gates, statues
//! - **Components**: pure data attached to entities (Machine, SpotLamp, ...)
//! - **Systems**: logic that queries and updates components each tick
//!
//! The [`engine::GameEngine`] drives one tick: interaction raycast, machine
//! progress, puzzle coordination, light feedback, then survival systems.
//!
//! # Example
//!
//! ```rust,no_run
//! use adrift_core::level::{load_manifest, spawn_level};
//!
//! let json = std::fs::read_to_string("data/station_level.json").unwrap();
//! let manifest = load_manifest(&json).unwrap();
//! let mut engine = spawn_level(&manifest).unwrap();
//!
//! // Run the game
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod events;
pub mod hud;
pub mod interaction;
pub mod level;
pub mod persistence;
pub mod raycast;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::GameEngine;
    pub use crate::events::WorldEvent;
    pub use crate::hud::HudModel;
    pub use crate::interaction::{Interactable, InteractionResponse};
    pub use crate::level::{load_manifest, spawn_level};
}
