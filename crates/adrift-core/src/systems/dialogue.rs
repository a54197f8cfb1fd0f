//! Dialogue sequencing.
//!
//! Plays an ordered list of lines with a typewriter reveal. Each line
//! either waits for an advance input or auto-advances after its hold
//! delay, and an advance during typing skips to the full line first.

use serde::{Deserialize, Serialize};
use tracing::debug;

use adrift_logic::color::LinearColor;
use adrift_logic::typewriter::Typewriter;

use crate::events::WorldEvent;
use crate::hud::HudModel;

/// One authored line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub text: String,
    pub color: LinearColor,
    /// Seconds per revealed character.
    pub type_speed: f32,
    /// Hold time after the line completes when auto-advancing.
    pub delay_after: f32,
}

impl DialogueEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: LinearColor::WHITE,
            type_speed: 0.05,
            delay_after: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SequencerPhase {
    /// Waiting out the intro delay before the first line.
    Intro { remaining: f32 },
    /// Revealing the current line.
    Typing(Typewriter),
    /// Line fully shown; counting down to auto-advance.
    Holding { remaining: f32 },
    /// Line fully shown; waiting for an advance input.
    AwaitingInput,
    Finished,
}

/// Drives one dialogue sequence onto the HUD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSequencer {
    name: String,
    entries: Vec<DialogueEntry>,
    index: usize,
    phase: SequencerPhase,
    /// When set, completed lines wait for input instead of auto-advancing.
    advance_on_input: bool,
}

impl DialogueSequencer {
    pub fn new(name: impl Into<String>, entries: Vec<DialogueEntry>, intro_delay: f32) -> Self {
        let phase = if entries.is_empty() {
            SequencerPhase::Finished
        } else {
            SequencerPhase::Intro {
                remaining: intro_delay.max(0.0),
            }
        };
        Self {
            name: name.into(),
            entries,
            index: 0,
            phase,
            advance_on_input: true,
        }
    }

    pub fn auto_advancing(mut self) -> Self {
        self.advance_on_input = false;
        self
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SequencerPhase::Finished)
    }

    pub fn tick(&mut self, dt: f32, hud: &mut HudModel, events: &mut Vec<WorldEvent>) {
        match &mut self.phase {
            SequencerPhase::Intro { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.start_line(hud);
                }
            }
            SequencerPhase::Typing(typewriter) => {
                typewriter.advance(dt);
                let color = self.entries[self.index].color;
                hud.dialogue.show_tinted(typewriter.visible().to_string(), color);
                if typewriter.is_complete() {
                    self.phase = if self.advance_on_input {
                        SequencerPhase::AwaitingInput
                    } else {
                        SequencerPhase::Holding {
                            remaining: self.entries[self.index].delay_after,
                        }
                    };
                }
            }
            SequencerPhase::Holding { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.next_line(hud, events);
                }
            }
            SequencerPhase::AwaitingInput | SequencerPhase::Finished => {}
        }
    }

    /// Player input: skip the reveal, or step to the next line if the
    /// current one is already fully shown.
    pub fn advance(&mut self, hud: &mut HudModel, events: &mut Vec<WorldEvent>) {
        match &mut self.phase {
            SequencerPhase::Typing(typewriter) => {
                typewriter.skip();
                let color = self.entries[self.index].color;
                hud.dialogue.show_tinted(typewriter.visible().to_string(), color);
                self.phase = if self.advance_on_input {
                    SequencerPhase::AwaitingInput
                } else {
                    SequencerPhase::Holding {
                        remaining: self.entries[self.index].delay_after,
                    }
                };
            }
            SequencerPhase::AwaitingInput => self.next_line(hud, events),
            _ => {}
        }
    }

    fn start_line(&mut self, hud: &mut HudModel) {
        let entry = &self.entries[self.index];
        debug!(sequence = %self.name, line = self.index, "dialogue line started");
        hud.dialogue.show_tinted(String::new(), entry.color);
        self.phase = SequencerPhase::Typing(Typewriter::new(entry.text.clone(), entry.type_speed));
    }

    fn next_line(&mut self, hud: &mut HudModel, events: &mut Vec<WorldEvent>) {
        self.index += 1;
        if self.index >= self.entries.len() {
            self.phase = SequencerPhase::Finished;
            hud.dialogue.hide();
            events.push(WorldEvent::DialogueFinished {
                sequence: self.name.clone(),
            });
            debug!(sequence = %self.name, "dialogue finished");
        } else {
            self.start_line(hud);
        }
    }
}
