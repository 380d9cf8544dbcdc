//! Quiet-period coalescing of recompute requests.
//!
//! The core has no clock; callers pass `Instant`s in. Every `schedule` pushes
//! the deadline out again, so a burst of edits yields a single run.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn from_millis(quiet_ms: u64) -> Self {
        Self::new(Duration::from_millis(quiet_ms))
    }

    /// Supersedes any pending run with one due `quiet` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Returns true exactly once when a scheduled run has come due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }
}
