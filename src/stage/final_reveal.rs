//! Final-reveal stage: the door timeline, the celebration and the audio panel.

use glam::Vec2;
use rand::rngs::StdRng;

use super::{Cue, StageId, StageLifecycle};
use crate::audio::Effect;
use crate::params::{ParticleParams, TimingConfig};
use crate::particles::{cheers_burst, confetti_burst, ParticlePool};
use crate::timeline::{Millis, Timeline, TimelineRunner};

/// Handle position once the door is unlocked (degrees)
pub const OPEN_HANDLE_ROTATION_DEG: f32 = 720.0;

/// Door animation phases, visited strictly in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DoorPhase {
    Hidden,
    Slammed,
    Opening,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoorAction {
    Slam,
    Unlock,
    Open,
    Celebrate,
}

pub struct FinalReveal {
    timing: TimingConfig,
    particle_params: ParticleParams,
    rng: StdRng,
    active: bool,
    phase: DoorPhase,
    timeline_started: bool,
    handle_rotation_deg: f32,
    content_revealed: bool,
    panel_visible: bool,
    bump_until: Millis,
    toast_until: Millis,
    particles: ParticlePool,
    runner: TimelineRunner<DoorAction>,
}

impl FinalReveal {
    pub fn new(timing: TimingConfig, particle_params: ParticleParams, rng: StdRng) -> Self {
        let particles = ParticlePool::new(particle_params.pool_capacity);
        Self {
            timing,
            particle_params,
            rng,
            active: false,
            phase: DoorPhase::Hidden,
            timeline_started: false,
            handle_rotation_deg: 0.0,
            content_revealed: false,
            panel_visible: false,
            bump_until: 0,
            toast_until: 0,
            particles,
            runner: TimelineRunner::new("final-reveal"),
        }
    }

    fn door_timeline(&self) -> Timeline<DoorAction> {
        Timeline::new()
            .then(self.timing.door_slam_ms, DoorAction::Slam)
            .then(self.timing.door_unlock_ms, DoorAction::Unlock)
            .then(self.timing.door_open_ms, DoorAction::Open)
            .then(self.timing.door_celebrate_ms, DoorAction::Celebrate)
    }

    fn apply(&mut self, action: DoorAction, now: Millis, cues: &mut Vec<Cue>) {
        match action {
            DoorAction::Slam => {
                self.phase = DoorPhase::Slammed;
                cues.push(Cue::Sound(Effect::Slam));
            }
            DoorAction::Unlock => {
                self.handle_rotation_deg = OPEN_HANDLE_ROTATION_DEG;
                cues.push(Cue::Sound(Effect::Unlock));
            }
            DoorAction::Open => {
                cues.push(Cue::Sound(Effect::Grind));
                self.phase = DoorPhase::Opening;
                self.content_revealed = true;
            }
            DoorAction::Celebrate => {
                let burst = confetti_burst(&mut self.rng, &self.particle_params, now);
                self.particles.spawn(burst);
                self.panel_visible = true;
                self.phase = DoorPhase::Revealed;
                log::info!("Vault open");
            }
        }
    }

    /// Click on the revealed content; every click is its own celebration
    pub fn cheers(&mut self, now: Millis, at: Vec2) -> Vec<Cue> {
        if !self.active || !self.content_revealed {
            return Vec::new();
        }
        self.bump_until = now + self.timing.bump_ms;
        self.toast_until = now + self.timing.toast_ms;
        let burst = cheers_burst(&mut self.rng, &self.particle_params, now, at);
        self.particles.spawn(burst);
        vec![Cue::Sound(Effect::Clink)]
    }

    pub fn toggle_music(&mut self) -> Vec<Cue> {
        if self.active && self.panel_visible {
            vec![Cue::ToggleMusic]
        } else {
            Vec::new()
        }
    }

    /// Ask for a full session reset (offered on the audio panel)
    pub fn reset(&mut self) -> Vec<Cue> {
        if self.active && self.panel_visible {
            vec![Cue::Reset]
        } else {
            Vec::new()
        }
    }

    pub fn phase(&self) -> DoorPhase {
        self.phase
    }

    pub fn handle_rotation_deg(&self) -> f32 {
        self.handle_rotation_deg
    }

    pub fn content_revealed(&self) -> bool {
        self.content_revealed
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn is_bumping(&self, now: Millis) -> bool {
        now < self.bump_until
    }

    pub fn is_toast_visible(&self, now: Millis) -> bool {
        now < self.toast_until
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }
}

impl StageLifecycle for FinalReveal {
    fn id(&self) -> StageId {
        StageId::FinalReveal
    }

    fn is_active(&self) -> bool {
        self.active
    }

    /// Start the door timeline the first time the stage becomes active
    fn activate(&mut self, now: Millis) -> Vec<Cue> {
        self.active = true;
        if self.phase == DoorPhase::Hidden && !self.timeline_started {
            self.timeline_started = true;
            let timeline = self.door_timeline();
            self.runner.schedule(now, timeline);
        }
        Vec::new()
    }

    fn deactivate(&mut self, _now: Millis) {
        self.active = false;
        self.runner.cancel();
        self.particles.clear();
    }

    fn tick(&mut self, now: Millis) -> Vec<Cue> {
        self.particles.prune(now);
        let mut cues = Vec::new();
        for action in self.runner.poll(now) {
            self.apply(action, now, &mut cues);
        }
        cues
    }
}
