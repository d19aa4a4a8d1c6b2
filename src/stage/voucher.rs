//! Voucher stage: a single continue action.

use super::{Cue, StageId, StageLifecycle};
use crate::audio::Effect;
use crate::timeline::Millis;

#[derive(Debug, Default)]
pub struct Voucher {
    active: bool,
    advanced: bool,
}

impl Voucher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click and move on; only the first press counts
    pub fn proceed(&mut self) -> Vec<Cue> {
        if !self.active || self.advanced {
            return Vec::new();
        }
        self.advanced = true;
        vec![Cue::Sound(Effect::Click), Cue::Advance]
    }
}

impl StageLifecycle for Voucher {
    fn id(&self) -> StageId {
        StageId::Voucher
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, _now: Millis) -> Vec<Cue> {
        self.active = true;
        Vec::new()
    }

    fn deactivate(&mut self, _now: Millis) {
        self.active = false;
    }

    fn tick(&mut self, _now: Millis) -> Vec<Cue> {
        Vec::new()
    }
}
