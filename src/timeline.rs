//! Delayed-action timelines with cancellation.
//!
//! A [`Timeline`] is an ordered list of `(delay, action)` pairs where each
//! delay is relative to the previous entry. A [`TimelineRunner`] converts
//! timelines into absolute due times and hands actions back in program order
//! when the clock passes them. Cancelling the runner drops everything still
//! pending, so a stage that is left can never be acted on by a stale chain.

/// Experience clock, in milliseconds
pub type Millis = u64;

/// Ordered list of relative delays and the actions they trigger
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<A> {
    steps: Vec<(Millis, A)>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<A> Timeline<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action that fires `delay_ms` after the previous one
    pub fn then(mut self, delay_ms: Millis, action: A) -> Self {
        self.steps.push((delay_ms, action));
        self
    }

    /// Total span from the first delay to the last action
    pub fn duration_ms(&self) -> Millis {
        self.steps.iter().map(|(delay, _)| delay).sum()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug)]
struct Pending<A> {
    due: Millis,
    seq: u64,
    action: A,
}

/// Executes timelines for one stage instance
#[derive(Debug)]
pub struct TimelineRunner<A> {
    /// Name used in log output
    label: &'static str,
    pending: Vec<Pending<A>>,
    next_seq: u64,
}

impl<A> TimelineRunner<A> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule a whole timeline starting at `now`
    pub fn schedule(&mut self, now: Millis, timeline: Timeline<A>) {
        log::debug!(
            "[{}] scheduling {} step(s) over {}ms",
            self.label,
            timeline.len(),
            timeline.duration_ms()
        );
        let mut due = now;
        for (delay, action) in timeline.steps {
            due += delay;
            self.push(due, action);
        }
    }

    /// Schedule a single action `delay_ms` after `now`
    pub fn schedule_once(&mut self, now: Millis, delay_ms: Millis, action: A) {
        self.push(now + delay_ms, action);
    }

    fn push(&mut self, due: Millis, action: A) {
        self.pending.push(Pending {
            due,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Remove and return every action due at or before `now`, in program order
    pub fn poll(&mut self, now: Millis) -> Vec<A> {
        if self.pending.iter().all(|p| p.due > now) {
            return Vec::new();
        }

        let (mut due, later): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| p.due <= now);
        self.pending = later;

        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.action).collect()
    }

    /// Drop every pending action; returns how many were dropped
    pub fn cancel(&mut self) -> usize {
        let dropped = self.pending.len();
        if dropped > 0 {
            log::debug!("[{}] cancelled {} pending step(s)", self.label, dropped);
        }
        self.pending.clear();
        dropped
    }

    /// Earliest due time still pending
    pub fn next_due(&self) -> Option<Millis> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}
