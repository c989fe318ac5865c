//! Media playback collaborator.
//!
//! The unwrap state machine only selects clips, toggles looping, starts
//! playback and observes `is_playing`; it never drives playback itself.

pub trait MediaPlayer {
    fn set_clip(&mut self, clip: &str);
    fn set_looping(&mut self, looping: bool);
    fn play(&mut self);
    fn is_playing(&self) -> bool;
}

/// Tick-driven stand-in for a real video player.
///
/// `play` starts the clip on the next [`SimulatedPlayer::advance`]; a
/// non-looping clip then plays for `clip_ticks` ticks.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlayer {
    clip: Option<String>,
    looping: bool,
    clip_ticks: u32,
    pending_start: bool,
    remaining: u32,
    played: Vec<String>,
}

impl SimulatedPlayer {
    #[must_use]
    pub fn new(clip_ticks: u32) -> Self {
        Self {
            clip_ticks,
            ..Self::default()
        }
    }

    /// Move playback forward by one tick.
    pub fn advance(&mut self) {
        if self.pending_start {
            self.pending_start = false;
            self.remaining = self.clip_ticks.max(1);
            return;
        }
        if self.remaining > 0 && !self.looping {
            self.remaining -= 1;
        }
    }

    #[must_use]
    pub fn clip(&self) -> Option<&str> {
        self.clip.as_deref()
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Clips passed to `play`, in order.
    #[must_use]
    pub fn played(&self) -> &[String] {
        &self.played
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn set_clip(&mut self, clip: &str) {
        self.clip = Some(clip.to_owned());
        self.remaining = 0;
        self.pending_start = false;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn play(&mut self) {
        if let Some(clip) = &self.clip {
            self.played.push(clip.clone());
            self.pending_start = true;
        }
    }

    fn is_playing(&self) -> bool {
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_starts_on_next_tick_and_runs_out() {
        let mut player = SimulatedPlayer::new(2);
        player.set_clip("unwrap_cube");
        player.play();
        assert!(!player.is_playing());

        player.advance();
        assert!(player.is_playing());
        player.advance();
        assert!(player.is_playing());
        player.advance();
        assert!(!player.is_playing());
        assert_eq!(player.played(), ["unwrap_cube".to_string()]);
    }

    #[test]
    fn play_without_clip_is_ignored() {
        let mut player = SimulatedPlayer::new(1);
        player.play();
        player.advance();
        assert!(!player.is_playing());
        assert!(player.played().is_empty());
    }
}
