//! Character-by-character reveal of assistant text.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    text: String,
    /// Number of chars currently shown.
    shown: usize,
    total: usize,
}

impl Reveal {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let total = text.chars().count();
        Self {
            text,
            shown: 0,
            total,
        }
    }

    /// Advances by as many chars as `elapsed` covers at `speed` per char.
    pub fn advance_by(&mut self, elapsed: Duration, speed: Duration) {
        if speed.is_zero() {
            self.shown = self.total;
            return;
        }
        let steps = (elapsed.as_millis() / speed.as_millis().max(1)) as usize;
        self.shown = self.shown.saturating_add(steps).min(self.total);
    }

    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.total
    }
}
