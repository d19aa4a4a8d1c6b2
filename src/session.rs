//! One run of the experience: orchestrator, stages and audio wired together.
//!
//! User events go to the active stage, stages answer with cues, and the
//! session routes those cues. Nothing here keeps its own timers; everything
//! advances through [`Session::tick`].

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::AudioEngine;
use crate::media::MediaClip;
use crate::params::ExperienceConfig;
use crate::stage::{
    Cue, EntryLock, FinalReveal, MediaReveal, Orchestrator, StageId, StageLifecycle, Voucher,
};
use crate::timeline::Millis;

pub struct Session {
    config: ExperienceConfig,
    seed: u64,
    /// Number of resets so far (varies the particle seed)
    generation: u64,
    orchestrator: Orchestrator,
    entry_lock: EntryLock,
    voucher: Voucher,
    media: MediaReveal,
    final_reveal: FinalReveal,
    audio: AudioEngine,
}

impl Session {
    pub fn new(
        config: ExperienceConfig,
        audio: AudioEngine,
        clip: Box<dyn MediaClip>,
        seed: u64,
    ) -> Self {
        let mut entry_lock = EntryLock::new(config.puzzle.clone(), config.timing.clone());
        entry_lock.activate(0);

        Self {
            orchestrator: Orchestrator::new(config.timing.transition_ms),
            entry_lock,
            voucher: Voucher::new(),
            media: MediaReveal::new(clip, config.timing.clone()),
            final_reveal: Self::build_final_reveal(&config, seed),
            audio,
            config,
            seed,
            generation: 0,
        }
    }

    fn build_final_reveal(config: &ExperienceConfig, seed: u64) -> FinalReveal {
        FinalReveal::new(
            config.timing.clone(),
            config.particles.clone(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn stage_mut(&mut self, id: StageId) -> &mut dyn StageLifecycle {
        match id {
            StageId::EntryLock => &mut self.entry_lock,
            StageId::Voucher => &mut self.voucher,
            StageId::MediaReveal => &mut self.media,
            StageId::FinalReveal => &mut self.final_reveal,
        }
    }

    /// Any pointer or touch anywhere; the first one brings audio up
    pub fn pointer_down(&mut self) {
        if self.orchestrator.pointer_down() {
            self.audio.initialize();
        }
    }

    /// Type into the current entry-lock step and submit it
    pub fn enter_code(&mut self, text: &str, now: Millis) {
        let step = self.entry_lock.step();
        self.entry_lock.set_input(step, text);
        let cues = self.entry_lock.submit(now);
        self.apply(StageId::EntryLock, cues, now);
    }

    pub fn proceed(&mut self, now: Millis) {
        let cues = self.voucher.proceed();
        self.apply(StageId::Voucher, cues, now);
    }

    pub fn toggle_clip(&mut self, now: Millis) {
        self.media.toggle(now);
    }

    pub fn click_tag(&mut self, now: Millis) {
        let cues = self.media.click_tag(now);
        self.apply(StageId::MediaReveal, cues, now);
    }

    pub fn cheers(&mut self, now: Millis, at: Vec2) {
        let cues = self.final_reveal.cheers(now, at);
        self.apply(StageId::FinalReveal, cues, now);
    }

    pub fn toggle_music(&mut self, now: Millis) {
        let cues = self.final_reveal.toggle_music();
        self.apply(StageId::FinalReveal, cues, now);
    }

    pub fn request_reset(&mut self, now: Millis) {
        let cues = self.final_reveal.reset();
        self.apply(StageId::FinalReveal, cues, now);
    }

    /// Advance every timeline to `now`
    pub fn tick(&mut self, now: Millis) {
        if let Some(transition) = self.orchestrator.tick(now) {
            self.stage_mut(transition.from).deactivate(now);
            let cues = self.stage_mut(transition.to).activate(now);
            self.apply(transition.to, cues, now);
        }

        for id in StageId::ALL {
            let cues = self.stage_mut(id).tick(now);
            self.apply(id, cues, now);
        }
    }

    fn apply(&mut self, from: StageId, cues: Vec<Cue>, now: Millis) {
        for cue in cues {
            match cue {
                Cue::Sound(effect) => self.audio.trigger(effect),
                Cue::InitAudio => {
                    self.audio.initialize();
                }
                Cue::Advance => {
                    let Some(to) = from.next() else {
                        continue;
                    };
                    if let Err(e) = self.orchestrator.advance(from, to, now) {
                        log::warn!("Ignoring advance: {}", e);
                    }
                }
                Cue::ToggleMusic => self.audio.toggle_music(),
                Cue::Reset => self.reset(now),
            }
        }
    }

    /// Back to the first stage. The audio graph survives; music is stopped.
    fn reset(&mut self, now: Millis) {
        log::info!("Session reset");
        if self.audio.is_music_playing() {
            self.audio.pause_music();
        }

        for id in StageId::ALL {
            self.stage_mut(id).deactivate(now);
        }
        self.generation += 1;

        self.orchestrator = Orchestrator::new(self.config.timing.transition_ms);
        // Audio is already up; the listener has nothing left to do
        self.orchestrator.pointer_down();
        self.entry_lock = EntryLock::new(self.config.puzzle.clone(), self.config.timing.clone());
        self.voucher = Voucher::new();
        self.media.reset();
        self.final_reveal =
            Self::build_final_reveal(&self.config, self.seed.wrapping_add(self.generation));
        self.entry_lock.activate(now);
    }

    pub fn config(&self) -> &ExperienceConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn entry_lock(&self) -> &EntryLock {
        &self.entry_lock
    }

    pub fn voucher(&self) -> &Voucher {
        &self.voucher
    }

    pub fn media(&self) -> &MediaReveal {
        &self.media
    }

    pub fn final_reveal(&self) -> &FinalReveal {
        &self.final_reveal
    }

    pub fn audio(&self) -> &AudioEngine {
        &self.audio
    }
}
