//! Machine repair state machine.
//!
//! A machine starts `Broken`, moves to `BeingFixed` while the player holds
//! the interact input on it, and lands in the terminal `Fixed` phase when
//! its normalized progress reaches 1.0. What happens to accumulated
//! progress when the player lets go is an explicit per-machine policy:
//! `Hold` freezes it, `Decay` drains it back toward zero.

use serde::{Deserialize, Serialize};

/// Repair phase. `Fixed` is terminal; there is no transition out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachinePhase {
    Broken,
    BeingFixed,
    Fixed,
}

/// What released progress does. Selected per machine in the level manifest;
/// the two behaviors never mix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReleasePolicy {
    /// Progress stays where it was until fixing resumes.
    Hold,
    /// Progress drains at `rate / time_to_fix` per second while Broken.
    Decay { rate: f32 },
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        ReleasePolicy::Hold
    }
}

/// Outcome of one repair tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixTick {
    /// No change this tick.
    Idle,
    /// Progress moved (in either direction) and the machine is not done.
    Progressed,
    /// Progress reached 1.0 this tick; fires at most once per machine.
    Completed,
}

/// Phase and normalized progress for one machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixState {
    pub phase: MachinePhase,
    pub progress: f32,
}

impl FixState {
    pub fn new() -> Self {
        Self {
            phase: MachinePhase::Broken,
            progress: 0.0,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.phase == MachinePhase::Fixed
    }

    pub fn is_being_fixed(&self) -> bool {
        self.phase == MachinePhase::BeingFixed
    }

    /// Begin repairing. Only valid from `Broken`; returns whether the
    /// transition happened.
    pub fn begin(&mut self) -> bool {
        if self.phase == MachinePhase::Broken {
            self.phase = MachinePhase::BeingFixed;
            true
        } else {
            false
        }
    }

    /// Stop repairing. The phase label returns to `Broken` immediately;
    /// progress is left in place for the release policy to deal with.
    /// Returns whether the machine was actually being fixed.
    pub fn release(&mut self) -> bool {
        if self.phase == MachinePhase::BeingFixed {
            self.phase = MachinePhase::Broken;
            true
        } else {
            false
        }
    }

    /// Advance one tick. Accumulates while `BeingFixed`, decays while
    /// `Broken` under a `Decay` policy, and pins progress to exactly 1.0
    /// on completion.
    pub fn advance(&mut self, dt: f32, time_to_fix: f32, release: ReleasePolicy) -> FixTick {
        if time_to_fix <= 0.0 {
            return FixTick::Idle;
        }
        match self.phase {
            MachinePhase::Fixed => FixTick::Idle,
            MachinePhase::BeingFixed => {
                self.progress += dt / time_to_fix;
                if self.progress >= 1.0 {
                    self.progress = 1.0;
                    self.phase = MachinePhase::Fixed;
                    FixTick::Completed
                } else {
                    FixTick::Progressed
                }
            }
            MachinePhase::Broken => match release {
                ReleasePolicy::Decay { rate } if self.progress > 0.0 => {
                    self.progress = (self.progress - rate * dt / time_to_fix).max(0.0);
                    FixTick::Progressed
                }
                _ => FixTick::Idle,
            },
        }
    }
}

impl Default for FixState {
    fn default() -> Self {
        Self::new()
    }
}
