//! Entry-lock stage: three numeric challenges and a final code.
//!
//! Steps 1-3 are numeric, step 4 is the final code, step 5 means unlocked.
//! A step can only be attempted while it is current, so reaching step 5
//! implies every earlier step matched, in order.

use super::{Cue, StageId, StageLifecycle};
use crate::audio::Effect;
use crate::error::SequenceError;
use crate::params::{PuzzleConfig, TimingConfig};
use crate::timeline::{Millis, Timeline, TimelineRunner};

/// Final code step
pub const FINAL_STEP: u8 = 4;

/// Terminal step: the lock is open
pub const UNLOCKED_STEP: u8 = 5;

/// Dial turn per solved challenge (degrees)
const DIAL_STEP_DEG: f32 = 120.0;

/// Handle turn per solved challenge (degrees)
const HANDLE_STEP_DEG: f32 = 45.0;

/// Handle position once unlocked (degrees)
const HANDLE_OPEN_DEG: f32 = 720.0;

/// Integer at the start of `text`: leading whitespace, an optional sign, then
/// a digit run. Anything after the digits is ignored ("23abc" reads as 23).
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockAction {
    /// Move from step `to - 1` to `to`
    Advance { to: u8 },
    ClearError { step: u8 },
    UnlockTone,
    Slam,
}

pub struct EntryLock {
    puzzle: PuzzleConfig,
    timing: TimingConfig,
    active: bool,
    step: u8,
    /// Raw text per step (index = step - 1)
    inputs: [String; 4],
    error_step: Option<u8>,
    dial_rotation_deg: f32,
    handle_rotation_deg: f32,
    /// A solved step is waiting for its advance delay
    advance_pending: bool,
    advanced: bool,
    runner: TimelineRunner<LockAction>,
}

impl EntryLock {
    pub fn new(puzzle: PuzzleConfig, timing: TimingConfig) -> Self {
        Self {
            puzzle,
            timing,
            active: false,
            step: 1,
            inputs: Default::default(),
            error_step: None,
            dial_rotation_deg: 0.0,
            handle_rotation_deg: 0.0,
            advance_pending: false,
            advanced: false,
            runner: TimelineRunner::new("entry-lock"),
        }
    }

    /// Store raw text for a step; typing clears the error flash
    pub fn set_input(&mut self, step: u8, text: &str) {
        if let Some(slot) = step
            .checked_sub(1)
            .and_then(|i| self.inputs.get_mut(i as usize))
        {
            *slot = text.to_string();
            self.error_step = None;
        }
    }

    /// Attempt whichever step is current
    pub fn submit(&mut self, now: Millis) -> Vec<Cue> {
        self.attempt(self.step, now).unwrap_or_default()
    }

    /// Attempt a specific step; only the current step may be attempted
    pub fn attempt(&mut self, step: u8, now: Millis) -> Result<Vec<Cue>, SequenceError> {
        if !self.active || self.step >= UNLOCKED_STEP {
            return Ok(Vec::new());
        }
        if step != self.step {
            return Err(SequenceError::StepOutOfOrder {
                attempted: step,
                current: self.step,
            });
        }
        if self.advance_pending {
            return Ok(Vec::new());
        }

        // The click is mechanical feedback, not a success signal
        let cues = vec![Cue::InitAudio, Cue::Sound(Effect::Click)];

        let matched = if step == FINAL_STEP {
            self.input(step) == self.puzzle.final_code
        } else {
            let expected = self.puzzle.challenges.get((step - 1) as usize).map(|c| c.answer);
            expected.is_some() && leading_integer(self.input(step)) == expected
        };

        if !matched {
            log::debug!("Step {} mismatch", step);
            self.error_step = Some(step);
            self.runner
                .schedule_once(now, self.timing.error_flash_ms, LockAction::ClearError { step });
            return Ok(cues);
        }

        if step == FINAL_STEP {
            self.step = UNLOCKED_STEP;
            log::info!("Entry lock opened");
            self.runner.schedule(
                now,
                Timeline::new()
                    .then(self.timing.unlock_tone_ms, LockAction::UnlockTone)
                    .then(self.timing.unlock_slam_ms, LockAction::Slam),
            );
        } else {
            self.dial_rotation_deg += DIAL_STEP_DEG;
            self.handle_rotation_deg += HANDLE_STEP_DEG;
            self.advance_pending = true;
            self.runner.schedule_once(
                now,
                self.timing.step_advance_ms,
                LockAction::Advance { to: step + 1 },
            );
        }
        Ok(cues)
    }

    fn apply(&mut self, action: LockAction, cues: &mut Vec<Cue>) {
        match action {
            LockAction::Advance { to } => {
                if self.step + 1 == to {
                    self.step = to;
                }
                self.advance_pending = false;
            }
            LockAction::ClearError { step } => {
                if self.error_step == Some(step) {
                    self.error_step = None;
                }
            }
            LockAction::UnlockTone => {
                self.handle_rotation_deg = HANDLE_OPEN_DEG;
                cues.push(Cue::Sound(Effect::Unlock));
            }
            LockAction::Slam => {
                cues.push(Cue::Sound(Effect::Slam));
                if !self.advanced {
                    self.advanced = true;
                    cues.push(Cue::Advance);
                }
            }
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn is_unlocked(&self) -> bool {
        self.step == UNLOCKED_STEP
    }

    pub fn error_step(&self) -> Option<u8> {
        self.error_step
    }

    pub fn has_error(&self, step: u8) -> bool {
        self.error_step == Some(step)
    }

    pub fn input(&self, step: u8) -> &str {
        step.checked_sub(1)
            .and_then(|i| self.inputs.get(i as usize))
            .map_or("", String::as_str)
    }

    /// Title and question for the current step
    pub fn prompt(&self) -> Option<(&str, &str)> {
        match self.step {
            FINAL_STEP => Some((
                self.puzzle.final_title.as_str(),
                self.puzzle.final_prompt.as_str(),
            )),
            s if s < FINAL_STEP => self
                .puzzle
                .challenges
                .get((s - 1) as usize)
                .map(|c| (c.title.as_str(), c.prompt.as_str())),
            _ => None,
        }
    }

    pub fn dial_rotation_deg(&self) -> f32 {
        self.dial_rotation_deg
    }

    pub fn handle_rotation_deg(&self) -> f32 {
        self.handle_rotation_deg
    }
}

impl StageLifecycle for EntryLock {
    fn id(&self) -> StageId {
        StageId::EntryLock
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
        self.runner.cancel();
    }

    fn tick(&mut self, now: Millis) -> Vec<Cue> {
        let mut cues = Vec::new();
        for action in self.runner.poll(now) {
            self.apply(action, &mut cues);
        }
        cues
    }
}
