use crate::model::{AnswerEvent, ShapeLogEntry};

/// Default countdown budget in seconds.
pub const DEFAULT_COUNTDOWN_SECS: f32 = 180.0;

/// Session countdown plus per-shape stopwatch, both fed by tick deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTimer {
    remaining: f32,
    elapsed: f32,
    shape_started_at: f32,
    expired: bool,
}

impl SessionTimer {
    #[must_use]
    pub fn new(budget_secs: f32) -> Self {
        Self {
            remaining: budget_secs.max(0.0),
            elapsed: 0.0,
            shape_started_at: 0.0,
            expired: false,
        }
    }

    /// Advance by `dt` seconds. Returns true only on the tick the countdown
    /// reaches zero.
    pub fn tick(&mut self, dt: f32) -> bool {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        if self.expired {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        if self.remaining <= 0.0 {
            self.expired = true;
            return true;
        }
        false
    }

    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Countdown as `MM:SS`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn display(&self) -> String {
        let total = self.remaining.floor() as u32;
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    /// Time the answer since the previous one (or session start) and restart
    /// the stopwatch.
    pub fn log_shape_time(&mut self, event: &AnswerEvent) -> ShapeLogEntry {
        let seconds = self.elapsed - self.shape_started_at;
        self.shape_started_at = self.elapsed;
        ShapeLogEntry {
            shape_name: event.shape_name.clone(),
            seconds,
            is_correct: event.is_correct,
            chosen: event.chosen.clone(),
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_SECS)
    }
}
