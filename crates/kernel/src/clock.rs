use std::time::{Duration, Instant};

/// Fixed-interval firing schedule for the frame scheduler.
///
/// Best effort: a late poll fires once, and firings missed while the host was
/// busy are dropped rather than replayed in a burst.
#[derive(Debug, Clone)]
pub struct TickClock {
    interval: Duration,
    next: Instant,
}

impl TickClock {
    /// First firing is one interval after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        assert!(!interval.is_zero(), "tick interval must be non-zero");
        Self {
            interval,
            next: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant of the next scheduled firing.
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Returns `true` if a firing is due at `now` and schedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            let behind = now - self.next;
            let skipped = 1 + behind.as_nanos() / self.interval.as_nanos();
            tracing::debug!(skipped, "tick clock fell behind, dropping missed firings");
            self.next = now + self.interval;
        }
        true
    }

    /// Restart the schedule from `now`, e.g. after the scheduler was stopped.
    pub fn reset(&mut self, now: Instant) {
        self.next = now + self.interval;
    }
}
