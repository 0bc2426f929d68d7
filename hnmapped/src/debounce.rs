//! Debounce timer
//!
//! A [`Debouncer`] defers an action until a quiet period has passed with no
//! further trigger. It holds no task or timer of its own: callers pass the
//! current instant, and whoever drives it (the session loop, or a test) waits
//! for [`deadline`](Debouncer::deadline) with `tokio::time::sleep_until`.
//!

use std::time::Duration;

use tokio::time::Instant;

/// Trailing-edge debounce state machine.
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

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Cancels any pending deadline and sets a new one `quiet` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Drops the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// When the pending action is due
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once per schedule, at or after the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::DEFAULT_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        assert!(!debouncer.fire_if_due(start));

        debouncer.schedule(start);
        assert!(debouncer.is_pending());
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(299)));
        assert!(debouncer.fire_if_due(start + QUIET));
        assert!(!debouncer.fire_if_due(start + QUIET * 2));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_reschedule_pushes_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        for step in 0..5 {
            debouncer.schedule(start + Duration::from_millis(step * 100));
        }
        let last = start + Duration::from_millis(400);
        assert_eq!(debouncer.deadline(), Some(last + QUIET));
        assert!(!debouncer.fire_if_due(start + QUIET));
        assert!(debouncer.fire_if_due(last + QUIET));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.quiet_period(), QUIET);
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(debouncer.deadline().is_none());
        assert!(!debouncer.fire_if_due(start + QUIET));
    }
}
