//! Component definitions for the ECS world.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior beyond their own state transitions - systems
//! drive everything else.

mod common;
mod player;
mod station;

pub use common::*;
pub use player::*;
pub use station::*;
