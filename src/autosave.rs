//! When to save.
//!
//! Edits arrive in bursts (typing, dragging, clicking arrows), so saving on
//! every change would thrash the store. [`Autosave`] decides when a save is
//! due:
//!
//! - **Debounce**: a save becomes due [`DEBOUNCE`] after the latest change.
//!   Each new change pushes the deadline back.
//! - **Sweep**: every [`SWEEP_INTERVAL`] a save is due if anything is still
//!   unsaved, even while changes keep arriving.
//! - **Force**: an explicit save or shutdown makes a save due immediately.
//!
//! The caller owns the clock and passes `Instant`s in, then calls
//! [`Autosave::mark_saved`] after a successful write.

use std::time::{Duration, Instant};

/// Quiet period after the last change before saving.
pub const DEBOUNCE: Duration = Duration::from_secs(1);

/// Interval of the unconditional dirty check.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Autosave {
    dirty: bool,
    forced: bool,
    deadline: Option<Instant>,
    next_sweep: Instant,
}

impl Autosave {
    pub fn new(now: Instant) -> Self {
        Self {
            dirty: false,
            forced: false,
            deadline: None,
            next_sweep: now + SWEEP_INTERVAL,
        }
    }

    /// Record a change, restarting the debounce window.
    pub fn mark_changed(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now + DEBOUNCE);
    }

    /// Request a save at the next poll regardless of timers.
    pub fn force(&mut self) {
        self.forced = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a save should happen now.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.forced {
            return true;
        }
        let sweep_due = now >= self.next_sweep;
        if sweep_due {
            self.next_sweep = now + SWEEP_INTERVAL;
        }
        if !self.dirty {
            return false;
        }
        sweep_due || self.deadline.is_some_and(|d| now >= d)
    }

    /// Clear pending state after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.forced = false;
        self.deadline = None;
    }
}
