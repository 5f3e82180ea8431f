use std::time::Duration;
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DebounceMode {
    /// Fire with the latest arguments once calls stop for the whole delay.
    #[default]
    Trailing,
    /// Fire on the first call, then ignore calls until the delay has passed.
    Leading,
    /// Fire with the first call's arguments exactly one delay after it;
    /// calls in between are dropped and do not extend the wait.
    Fixed,
}

/// Poll-driven debounce gate. The caller supplies the clock, so the gate runs
/// the same under any event loop and in tests.
#[derive(Debug)]
pub struct Debounce<A> {
    delay: Duration,
    mode: DebounceMode,
    pending: Option<A>,
    deadline: Option<Instant>,
}

impl<A> Debounce<A> {
    pub fn new(delay: Duration, mode: DebounceMode) -> Self {
        Self {
            delay,
            mode,
            pending: None,
            deadline: None,
        }
    }

    pub fn mode(&self) -> DebounceMode {
        self.mode
    }

    /// Registers a call. Returns the arguments when they should run right
    /// away (leading mode only).
    pub fn call(&mut self, now: Instant, args: A) -> Option<A> {
        match self.mode {
            DebounceMode::Trailing => {
                self.pending = Some(args);
                self.deadline = Some(now + self.delay);
                None
            }
            DebounceMode::Leading => {
                if self.deadline.is_some_and(|deadline| deadline > now) {
                    return None;
                }
                self.deadline = Some(now + self.delay);
                Some(args)
            }
            DebounceMode::Fixed => {
                if self.deadline.is_none() {
                    self.pending = Some(args);
                    self.deadline = Some(now + self.delay);
                }
                None
            }
        }
    }

    /// Returns the pending arguments once their deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<A> {
        let deadline = self.deadline?;
        if deadline > now {
            return None;
        }
        self.deadline = None;
        self.pending.take()
    }

    /// When the next firing is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and(self.deadline)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DELAY: Duration = Duration::from_millis(5);

    /// Millisecond test clock that polls on every tick and records firings
    /// as `(ms, args)`.
    struct Clock {
        start: Instant,
        ms: u64,
        fired: Vec<(u64, u32)>,
    }

    impl Clock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                ms: 0,
                fired: Vec::new(),
            }
        }

        fn now(&self) -> Instant {
            self.start + Duration::from_millis(self.ms)
        }

        fn call(&mut self, gate: &mut Debounce<u32>, args: u32) {
            if let Some(args) = gate.call(self.now(), args) {
                self.fired.push((self.ms, args));
            }
        }

        fn advance(&mut self, gate: &mut Debounce<u32>, ms: u64) {
            for _ in 0..ms {
                self.ms += 1;
                if let Some(args) = gate.poll(self.now()) {
                    self.fired.push((self.ms, args));
                }
            }
        }
    }

    #[test]
    fn trailing_fires_latest_after_quiet_period() {
        let mut gate = Debounce::new(DELAY, DebounceMode::Trailing);
        let mut clock = Clock::new();
        clock.call(&mut gate, 1);
        clock.call(&mut gate, 2);
        clock.advance(&mut gate, 1);
        clock.call(&mut gate, 3);
        clock.advance(&mut gate, 1);
        clock.call(&mut gate, 4);
        clock.advance(&mut gate, 5);
        assert_eq!(clock.fired, vec![(7, 4)]);
        clock.call(&mut gate, 5);
        clock.advance(&mut gate, 5);
        assert_eq!(clock.fired, vec![(7, 4), (12, 5)]);
    }

    #[test]
    fn leading_fires_first_and_drops_the_rest() {
        let mut gate = Debounce::new(DELAY, DebounceMode::Leading);
        let mut clock = Clock::new();
        clock.call(&mut gate, 1);
        clock.call(&mut gate, 2);
        clock.call(&mut gate, 2);
        clock.call(&mut gate, 2);
        assert_eq!(clock.fired, vec![(0, 1)]);
        assert_eq!(gate.next_deadline(), None);
        clock.advance(&mut gate, 5);
        clock.call(&mut gate, 3);
        assert_eq!(clock.fired, vec![(0, 1), (5, 3)]);
    }

    #[test]
    fn fixed_fires_on_schedule_without_extension() {
        let mut gate = Debounce::new(DELAY, DebounceMode::Fixed);
        let mut clock = Clock::new();
        clock.call(&mut gate, 1);
        clock.call(&mut gate, 2);
        clock.advance(&mut gate, 1);
        clock.call(&mut gate, 3);
        clock.advance(&mut gate, 1);
        clock.call(&mut gate, 4);
        clock.advance(&mut gate, 3);
        assert_eq!(clock.fired, vec![(5, 1)]);
        clock.call(&mut gate, 5);
        clock.advance(&mut gate, 1);
        clock.call(&mut gate, 6);
        clock.advance(&mut gate, 2);
        clock.call(&mut gate, 7);
        clock.advance(&mut gate, 2);
        assert_eq!(clock.fired, vec![(5, 1), (10, 5)]);
    }

    #[test]
    fn cancel_drops_pending_call() {
        let mut gate = Debounce::new(DELAY, DebounceMode::Trailing);
        let start = Instant::now();
        gate.call(start, 1);
        assert_eq!(gate.next_deadline(), Some(start + DELAY));
        gate.cancel();
        assert_eq!(gate.next_deadline(), None);
        assert_eq!(gate.poll(start + DELAY * 2), None);
    }
}
