//! Debounced task scheduling
//!
//! Derived views and persistence are recomputed only once input pauses.
//! Each concern gets its own `Debouncer`: an explicit deadline the host
//! drives by calling `Session::tick`, with cancellation guaranteed on
//! teardown. Single-threaded by design; there is no timer thread to race
//! with a document mutation.

use std::time::{Duration, Instant};

/// Debounce window for the scene index refresh
pub const SCENE_UPDATE_DELAY: Duration = Duration::from_millis(500);

/// Debounce window for the character registry refresh
pub const CHARACTERS_UPDATE_DELAY: Duration = Duration::from_millis(500);

/// Debounce window for the full-document save
pub const EDITOR_SAVE_DELAY: Duration = Duration::from_millis(2000);

/// A single resettable deadline. Scheduling again before expiry pushes the
/// deadline out, coalescing rapid changes; cancelling guarantees the task
/// never fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    /// (Re)arm the deadline at `now + delay`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm; a cancelled deadline never fires
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has expired. Returns true at most once
    /// per schedule.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.schedule(t0);

        assert!(!d.fire_if_due(t0 + Duration::from_millis(499)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(500)));
        // consumed; does not fire twice
        assert!(!d.fire_if_due(t0 + Duration::from_millis(600)));
    }

    #[test]
    fn test_reschedule_coalesces() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(400));

        // the first deadline was pushed out
        assert!(!d.fire_if_due(t0 + Duration::from_millis(500)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_cancel_never_fires() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.schedule(t0);
        d.cancel();

        assert!(!d.is_pending());
        assert!(!d.fire_if_due(t0 + Duration::from_secs(10)));
    }
}
