//! Host-facing gameplay events.

/// Events the engine queues for the host to drain each frame. The core
/// never acts on these beyond raising them; level changes, death screens,
/// and VFX belong to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// Every machine on the board is repaired.
    AllMachinesFixed,
    /// The player used an unlocked exit gate.
    LevelTransition { destination: String },
    /// The player's oxygen hit zero.
    OxygenDepleted,
    /// A dialogue sequence played to the end.
    DialogueFinished { sequence: String },
    /// A stalker statue closed within reach of the player.
    StalkerReachedPlayer,
}
