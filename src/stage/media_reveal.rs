//! Media-reveal stage: recorded clip, replay overlay and the hanging tag.

use super::{Cue, StageId, StageLifecycle};
use crate::audio::Effect;
use crate::media::MediaClip;
use crate::params::TimingConfig;
use crate::timeline::{Millis, TimelineRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaAction {
    PauseClip,
}

pub struct MediaReveal {
    clip: Box<dyn MediaClip>,
    timing: TimingConfig,
    active: bool,
    overlay_visible: bool,
    replay: bool,
    tag_dropped: bool,
    /// Content is falling out of frame
    dropped_out: bool,
    advanced: bool,
    runner: TimelineRunner<MediaAction>,
}

impl MediaReveal {
    pub fn new(clip: Box<dyn MediaClip>, timing: TimingConfig) -> Self {
        Self {
            clip,
            timing,
            active: false,
            overlay_visible: false,
            replay: false,
            tag_dropped: false,
            dropped_out: false,
            advanced: false,
            runner: TimelineRunner::new("media-reveal"),
        }
    }

    fn on_clip_ended(&mut self) -> Vec<Cue> {
        self.overlay_visible = true;
        self.replay = true;
        self.tag_dropped = true;
        vec![Cue::Sound(Effect::Drop)]
    }

    /// Manual play/pause from the overlay
    pub fn toggle(&mut self, now: Millis) {
        if !self.active {
            return;
        }
        if self.clip.is_paused() {
            match self.clip.play(now) {
                Ok(()) => {
                    self.overlay_visible = false;
                    self.tag_dropped = false;
                }
                Err(e) => log::warn!("Clip refused to play: {}", e),
            }
        } else {
            self.clip.pause(now);
            self.overlay_visible = true;
        }
    }

    /// The tag was clicked: drop the content out and move on right away
    pub fn click_tag(&mut self, now: Millis) -> Vec<Cue> {
        if !self.active || self.advanced {
            return Vec::new();
        }
        self.advanced = true;
        self.dropped_out = true;
        self.runner
            .schedule_once(now, self.timing.tag_pause_ms, MediaAction::PauseClip);
        vec![Cue::Advance]
    }

    /// Back to the initial state with the clip rewound
    pub fn reset(&mut self) {
        self.runner.cancel();
        self.clip.rewind();
        self.active = false;
        self.overlay_visible = false;
        self.replay = false;
        self.tag_dropped = false;
        self.dropped_out = false;
        self.advanced = false;
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn tag_dropped(&self) -> bool {
        self.tag_dropped
    }

    pub fn dropped_out(&self) -> bool {
        self.dropped_out
    }

    pub fn clip_paused(&self) -> bool {
        self.clip.is_paused()
    }
}

impl StageLifecycle for MediaReveal {
    fn id(&self) -> StageId {
        StageId::MediaReveal
    }

    fn is_active(&self) -> bool {
        self.active
    }

    /// Try to autoplay with sound; a refusal just shows the play overlay
    fn activate(&mut self, now: Millis) -> Vec<Cue> {
        self.active = true;
        self.clip.set_muted(false);
        match self.clip.play(now) {
            Ok(()) => self.overlay_visible = false,
            Err(e) => {
                log::info!("Autoplay blocked, waiting for play: {}", e);
                self.overlay_visible = true;
            }
        }
        Vec::new()
    }

    fn deactivate(&mut self, now: Millis) {
        self.active = false;
        self.runner.cancel();
        if !self.clip.is_paused() {
            self.clip.pause(now);
        }
    }

    fn tick(&mut self, now: Millis) -> Vec<Cue> {
        let mut cues = Vec::new();
        if self.active && self.clip.poll_ended(now) {
            cues.extend(self.on_clip_ended());
        }
        for action in self.runner.poll(now) {
            match action {
                MediaAction::PauseClip => self.clip.pause(now),
            }
        }
        cues
    }
}
