//! Player-side components.

use adrift_logic::oxygen::OxygenMeter;
use serde::{Deserialize, Serialize};

/// Marker for the player entity. Exactly one per world.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player;

/// The player's dwindling air supply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OxygenSupply {
    pub meter: OxygenMeter,
    /// Units drained per second.
    pub drain_rate: f32,
    /// HUD warns strictly below this fraction.
    pub low_fraction: f32,
    /// Depletion is announced once; refilling re-arms it.
    pub depleted_notified: bool,
}

impl OxygenSupply {
    pub fn new(max: f32, drain_rate: f32) -> Self {
        Self {
            meter: OxygenMeter::full(max),
            drain_rate,
            low_fraction: 0.5,
            depleted_notified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_defaults() {
        let supply = OxygenSupply::new(100.0, 1.0);
        assert_eq!(supply.meter.percent(), 100);
        assert!(!supply.depleted_notified);
    }
}
