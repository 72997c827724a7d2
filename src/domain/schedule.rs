use std::time::{Duration, Instant};

/// Repeating status-read schedule with a single in-flight guard.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    next_due: Option<Instant>,
    in_flight: bool,
}

impl PollSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            in_flight: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    /// Makes the next read due immediately. An outstanding read is not
    /// duplicated; the new one goes out once it completes.
    pub fn restart(&mut self, now: Instant) {
        self.start(now);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Returns true when a read should be issued now, and marks it in flight.
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(next_due) = self.next_due else {
            return false;
        };
        if self.in_flight || now < next_due {
            return false;
        }
        self.in_flight = true;
        self.next_due = Some(now + self.interval);
        true
    }

    pub fn complete(&mut self) {
        self.in_flight = false;
    }
}
