//! Debounce timers.
//!
//! Bursts of notifications (row edits in the inputs list, several drops in
//! one gesture, renames) are coalesced: each `schedule` restarts the quiet
//! period and the owner runs its action once when `fire_due` reports the
//! period elapsed. The action always reads current state at fire time.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    name: &'static str,
    delay: Duration,
    due: Option<Instant>,
}

impl Debouncer {
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            due: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start or restart the quiet period.
    pub fn schedule(&mut self) {
        self.due = Some(Instant::now() + self.delay);
        log::trace!("{}: scheduled in {}ms", self.name, self.delay.as_millis());
    }

    pub fn cancel(&mut self) {
        if self.due.take().is_some() {
            log::trace!("{}: cancelled", self.name);
        }
    }

    /// True once per schedule, as soon as `now` reaches the deadline.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                log::trace!("{}: firing", self.name);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }
}
