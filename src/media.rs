//! Recorded-media collaborator used by the media-reveal stage.

use thiserror::Error;

use crate::timeline::Millis;

/// The host refused to start playback (typically autoplay without a gesture)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("playback rejected: {0}")]
pub struct PlaybackRejected(pub String);

/// Imperative control over a recorded clip
pub trait MediaClip {
    fn play(&mut self, now: Millis) -> Result<(), PlaybackRejected>;

    fn pause(&mut self, now: Millis);

    fn is_paused(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Returns `true` once each time playback reaches the end
    fn poll_ended(&mut self, now: Millis) -> bool;

    /// Seek back to the start, paused
    fn rewind(&mut self);
}

/// Clock-driven clip of fixed length (no decoding, position only)
#[derive(Debug, Clone)]
pub struct TimedClip {
    duration_ms: Millis,
    /// Position at the moment playback last started or stopped
    position_ms: Millis,
    playing_since: Option<Millis>,
    /// Reject the next play request, as a browser blocks unmuted autoplay
    block_next_play: bool,
}

impl TimedClip {
    pub fn new(duration_ms: Millis) -> Self {
        Self {
            duration_ms,
            position_ms: 0,
            playing_since: None,
            block_next_play: false,
        }
    }

    /// Make the first play request fail
    pub fn with_blocked_autoplay(mut self) -> Self {
        self.block_next_play = true;
        self
    }

    pub fn position_ms(&self, now: Millis) -> Millis {
        let running = self
            .playing_since
            .map_or(0, |since| now.saturating_sub(since));
        (self.position_ms + running).min(self.duration_ms)
    }
}

impl MediaClip for TimedClip {
    fn play(&mut self, now: Millis) -> Result<(), PlaybackRejected> {
        if self.block_next_play {
            self.block_next_play = false;
            return Err(PlaybackRejected("autoplay with sound is not allowed".to_string()));
        }
        if self.playing_since.is_some() {
            return Ok(());
        }
        // Playing a finished clip starts it over
        if self.position_ms >= self.duration_ms {
            self.position_ms = 0;
        }
        self.playing_since = Some(now);
        Ok(())
    }

    fn pause(&mut self, now: Millis) {
        self.position_ms = self.position_ms(now);
        self.playing_since = None;
    }

    fn is_paused(&self) -> bool {
        self.playing_since.is_none()
    }

    // No audio track to mute
    fn set_muted(&mut self, _muted: bool) {}

    fn poll_ended(&mut self, now: Millis) -> bool {
        if self.playing_since.is_some() && self.position_ms(now) >= self.duration_ms {
            self.position_ms = self.duration_ms;
            self.playing_since = None;
            return true;
        }
        false
    }

    fn rewind(&mut self) {
        self.position_ms = 0;
        self.playing_since = None;
    }
}
