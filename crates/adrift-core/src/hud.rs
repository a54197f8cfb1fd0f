//! Plain-data HUD state.
//!
//! The core never draws. It keeps the HUD's widget values here and the
//! host renders them verbatim: prompt and objective text, the shared
//! repair progress bar, the oxygen readout, the dialogue line, and the
//! countdown display.

use adrift_logic::color::LinearColor;

/// A text widget: contents, visibility, and tint.
#[derive(Debug, Clone, PartialEq)]
pub struct TextWidget {
    pub text: String,
    pub visible: bool,
    pub color: LinearColor,
}

impl TextWidget {
    fn hidden() -> Self {
        Self {
            text: String::new(),
            visible: false,
            color: LinearColor::WHITE,
        }
    }

    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.visible = true;
    }

    pub fn show_tinted(&mut self, text: impl Into<String>, color: LinearColor) {
        self.show(text);
        self.color = color;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// The shared repair progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressWidget {
    /// Fill fraction in [0, 1].
    pub fraction: f32,
    pub visible: bool,
}

impl ProgressWidget {
    fn hidden() -> Self {
        Self {
            fraction: 0.0,
            visible: false,
        }
    }

    pub fn show(&mut self, fraction: f32) {
        self.fraction = fraction.clamp(0.0, 1.0);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.fraction = 0.0;
    }
}

/// Every widget the gameplay layer writes to.
#[derive(Debug, Clone)]
pub struct HudModel {
    /// Interaction prompt under the crosshair.
    pub prompt: TextWidget,
    /// Repair progress for the machine being fixed.
    pub progress_bar: ProgressWidget,
    /// Current puzzle objective headline.
    pub objective: TextWidget,
    /// Current puzzle task detail.
    pub task: TextWidget,
    /// Oxygen percentage readout.
    pub oxygen: TextWidget,
    /// Active dialogue line.
    pub dialogue: TextWidget,
    /// Countdown display.
    pub timer: TextWidget,
    /// Transient notices (locked gate, station restored).
    pub notice: TextWidget,
}

impl HudModel {
    pub fn new() -> Self {
        Self {
            prompt: TextWidget::hidden(),
            progress_bar: ProgressWidget::hidden(),
            objective: TextWidget::hidden(),
            task: TextWidget::hidden(),
            oxygen: TextWidget::hidden(),
            dialogue: TextWidget::hidden(),
            timer: TextWidget::hidden(),
            notice: TextWidget::hidden(),
        }
    }

    pub fn set_objective(&mut self, objective: impl Into<String>, task: impl Into<String>) {
        self.objective.show(objective);
        self.task.show(task);
    }
}

impl Default for HudModel {
    fn default() -> Self {
        Self::new()
    }
}
