//! Character-by-character text reveal.
//!
//! Dialogue lines type themselves out at a configurable seconds-per-
//! character pace. Oversized frame deltas reveal several characters in one
//! tick; a skip reveals the whole line at once. Reveal counts are in
//! characters, not bytes, so multi-byte text never splits mid-glyph.

use serde::{Deserialize, Serialize};

/// One line of text partway through being revealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Typewriter {
    text: String,
    /// Seconds per revealed character. Zero or less reveals instantly.
    seconds_per_char: f32,
    revealed: usize,
    accumulated: f32,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, seconds_per_char: f32) -> Self {
        Self {
            text: text.into(),
            seconds_per_char,
            revealed: 0,
            accumulated: 0.0,
        }
    }

    /// Advance by `dt` seconds. Returns true on the tick that reveals the
    /// final character.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.is_complete() {
            return false;
        }
        let total = self.char_count();
        if self.seconds_per_char <= 0.0 {
            self.revealed = total;
            return true;
        }

        self.accumulated += dt;
        while self.accumulated >= self.seconds_per_char && self.revealed < total {
            self.accumulated -= self.seconds_per_char;
            self.revealed += 1;
        }
        self.revealed == total
    }

    /// Reveal the entire line immediately.
    pub fn skip(&mut self) {
        self.revealed = self.char_count();
        self.accumulated = 0.0;
    }

    pub fn is_complete(&self) -> bool {
        self.revealed >= self.char_count()
    }

    /// The currently visible prefix of the line.
    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.revealed) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveals_one_char_per_interval() {
        let mut tw = Typewriter::new("abcd", 0.05);
        tw.advance(0.05);
        assert_eq!(tw.visible(), "a");
        tw.advance(0.05);
        assert_eq!(tw.visible(), "ab");
    }

    #[test]
    fn test_large_delta_catches_up_without_overrun() {
        let mut tw = Typewriter::new("abc", 0.05);
        let done = tw.advance(10.0);
        assert!(done);
        assert_eq!(tw.visible(), "abc");
        assert!(!tw.advance(10.0), "completion must not re-fire");
    }

    #[test]
    fn test_skip_lands_on_full_line() {
        let mut tw = Typewriter::new("hold on", 1.0);
        tw.advance(0.5);
        assert_eq!(tw.visible(), "");
        tw.skip();
        assert!(tw.is_complete());
        assert_eq!(tw.visible(), "hold on");
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let mut tw = Typewriter::new("héllo", 0.1);
        tw.advance(0.2);
        assert_eq!(tw.visible(), "hé");
    }

    #[test]
    fn test_instant_speed() {
        let mut tw = Typewriter::new("now", 0.0);
        assert!(tw.advance(0.001));
        assert_eq!(tw.visible(), "now");
    }

    #[test]
    fn test_empty_line_is_immediately_complete() {
        let tw = Typewriter::new("", 0.05);
        assert!(tw.is_complete());
        assert_eq!(tw.visible(), "");
    }
}
