//! Trailing debounce for "changes settled" signals.
//!
//! Rapid-fire manipulation events (a continuous drag) re-arm the window on
//! every trigger; the signal fires once the window elapses with no further
//! triggers. This throttles external notification/autosave work only — the
//! document store is updated immediately on every event.
//!
//! Time is injected by the caller, so tests never sleep.

use std::time::{Duration, Instant};

pub const SETTLE_DELAY: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re-)arm the window from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once after the window has elapsed without re-arming.
    pub fn fire_ready(&mut self, now: Instant) -> bool {
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
        Self::new(SETTLE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_window() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        d.arm(t0);

        assert!(!d.fire_ready(t0 + Duration::from_millis(50)));
        assert!(d.fire_ready(t0 + Duration::from_millis(100)));
        // Already fired; stays quiet until re-armed.
        assert!(!d.fire_ready(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn rearming_extends_the_window() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        d.arm(t0);
        d.arm(t0 + Duration::from_millis(80));

        assert!(!d.fire_ready(t0 + Duration::from_millis(120)));
        assert!(d.fire_ready(t0 + Duration::from_millis(180)));
    }

    #[test]
    fn cancel_disarms() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        d.arm(t0);
        d.cancel();
        assert!(!d.is_armed());
        assert!(!d.fire_ready(t0 + Duration::from_secs(1)));
    }
}
