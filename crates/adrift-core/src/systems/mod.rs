//! Systems - logic that operates on components

mod dialogue;
mod fixing;
mod interaction;
mod lighting;
mod oxygen;
mod puzzle;
mod stalker;

pub use dialogue::*;
pub use fixing::*;
pub use interaction::*;
pub use lighting::*;
pub use oxygen::*;
pub use puzzle::*;
pub use stalker::*;
