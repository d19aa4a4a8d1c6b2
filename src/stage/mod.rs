//! The four presentation stages and the orchestrator that sequences them.
//!
//! Stages never call each other. They turn user events and timeline steps
//! into [`Cue`]s, and the session routes those cues to the audio engine and
//! the orchestrator.

mod entry_lock;
mod final_reveal;
mod media_reveal;
mod orchestrator;
mod voucher;

pub use entry_lock::{EntryLock, FINAL_STEP, UNLOCKED_STEP};
pub use final_reveal::{DoorPhase, FinalReveal, OPEN_HANDLE_ROTATION_DEG};
pub use media_reveal::MediaReveal;
pub use orchestrator::{Orchestrator, Transition};
pub use voucher::Voucher;

use crate::audio::Effect;
use crate::timeline::Millis;

/// Stage identifiers in sequence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageId {
    EntryLock,
    Voucher,
    MediaReveal,
    FinalReveal,
}

impl StageId {
    pub const ALL: [StageId; 4] = [
        StageId::EntryLock,
        StageId::Voucher,
        StageId::MediaReveal,
        StageId::FinalReveal,
    ];

    /// The stage that follows this one; `None` for the terminal stage
    pub fn next(self) -> Option<StageId> {
        match self {
            StageId::EntryLock => Some(StageId::Voucher),
            StageId::Voucher => Some(StageId::MediaReveal),
            StageId::MediaReveal => Some(StageId::FinalReveal),
            StageId::FinalReveal => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageId::EntryLock => "entry-lock",
            StageId::Voucher => "voucher",
            StageId::MediaReveal => "media-reveal",
            StageId::FinalReveal => "final-reveal",
        }
    }
}

/// Exit animation requested for a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitState {
    #[default]
    None,
    Up,
    Down,
}

/// Side effects a stage asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Sound(Effect),
    /// This stage is done; move to the next one
    Advance,
    InitAudio,
    ToggleMusic,
    Reset,
}

/// Activation lifecycle shared by every stage
pub trait StageLifecycle {
    fn id(&self) -> StageId;

    fn is_active(&self) -> bool;

    fn activate(&mut self, now: Millis) -> Vec<Cue>;

    /// Leave the stage; anything still scheduled is cancelled
    fn deactivate(&mut self, now: Millis);

    /// Run timeline steps that are due
    fn tick(&mut self, now: Millis) -> Vec<Cue>;
}
