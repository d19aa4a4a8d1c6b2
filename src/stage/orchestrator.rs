//! Macro-stage sequencing with a fixed cross-fade.

use super::{ExitState, StageId};
use crate::error::SequenceError;
use crate::timeline::{Millis, TimelineRunner};

/// A completed (or in-flight) move between adjacent stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StageId,
    pub to: StageId,
}

/// Owns which stage is active and which one is on its way out
#[derive(Debug)]
pub struct Orchestrator {
    active: StageId,
    in_flight: Option<Transition>,
    runner: TimelineRunner<Transition>,
    transition_ms: Millis,
    /// First-interaction listener still attached
    awaiting_interaction: bool,
}

impl Orchestrator {
    pub fn new(transition_ms: Millis) -> Self {
        Self {
            active: StageId::EntryLock,
            in_flight: None,
            runner: TimelineRunner::new("orchestrator"),
            transition_ms,
            awaiting_interaction: true,
        }
    }

    /// Start the cross-fade from `from` to `to`; the switch lands after the delay
    pub fn advance(&mut self, from: StageId, to: StageId, now: Millis) -> Result<(), SequenceError> {
        if let Some(t) = self.in_flight {
            return Err(SequenceError::TransitionInFlight {
                from: t.from,
                to: t.to,
            });
        }
        if from != self.active {
            return Err(SequenceError::NotActive {
                from,
                active: self.active,
            });
        }
        if from.next() != Some(to) {
            return Err(SequenceError::NotAdjacent { from, to });
        }

        let transition = Transition { from, to };
        self.in_flight = Some(transition);
        self.runner
            .schedule_once(now, self.transition_ms, transition);
        log::info!("Stage {} exiting -> {}", from.name(), to.name());
        Ok(())
    }

    /// Land a due transition, reporting it so stages can be swapped
    pub fn tick(&mut self, now: Millis) -> Option<Transition> {
        let mut landed = None;
        for transition in self.runner.poll(now) {
            self.active = transition.to;
            self.in_flight = None;
            log::info!("Stage {} active", transition.to.name());
            landed = Some(transition);
        }
        landed
    }

    /// Record a pointer/touch interaction. Returns `true` only for the first
    /// one, which is when audio should be initialised.
    pub fn pointer_down(&mut self) -> bool {
        std::mem::replace(&mut self.awaiting_interaction, false)
    }

    pub fn active(&self) -> StageId {
        self.active
    }

    pub fn exiting(&self) -> Option<StageId> {
        self.in_flight.map(|t| t.from)
    }

    pub fn is_active(&self, stage: StageId) -> bool {
        self.active == stage
    }

    pub fn exit_state(&self, stage: StageId) -> ExitState {
        if self.exiting() == Some(stage) {
            ExitState::Up
        } else {
            ExitState::None
        }
    }

    /// True once the terminal stage is active
    pub fn is_finished(&self) -> bool {
        self.active.next().is_none()
    }
}
