use std::time::Duration;
use std::time::Instant;

/// Poll-driven throttle: the first call runs at once, later calls within the
/// interval collapse into one deferred run with the newest arguments.
#[derive(Debug)]
pub struct Throttle<A> {
    interval: Duration,
    last_fired: Option<Instant>,
    pending: Option<A>,
    deadline: Option<Instant>,
}

impl<A> Throttle<A> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: None,
            deadline: None,
        }
    }

    pub fn call(&mut self, now: Instant, args: A) -> Option<A> {
        let Some(last) = self.last_fired else {
            self.last_fired = Some(now);
            return Some(args);
        };
        self.pending = Some(args);
        self.deadline = Some((last + self.interval).max(now));
        None
    }

    pub fn poll(&mut self, now: Instant) -> Option<A> {
        let deadline = self.deadline?;
        if deadline > now {
            return None;
        }
        if let Some(last) = self.last_fired
            && now.duration_since(last) < self.interval
        {
            return None;
        }
        self.deadline = None;
        let args = self.pending.take()?;
        self.last_fired = Some(now);
        Some(args)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and(self.deadline)
    }

    /// Drops the deferred call. The interval since the last run still holds.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}
