use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::model::SimTime;

/// Time source for the engine driver.
pub trait Clock {
    fn now(&self) -> SimTime;
}

/// Milliseconds elapsed since the clock was created.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> SimTime {
        SimTime::from_millis(self.start.elapsed().as_millis() as u64)
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(time: SimTime) -> Self {
        let clock = Self::new();
        clock.set(time);
        clock
    }

    pub fn set(&self, time: SimTime) {
        self.now.set(time.millis());
    }

    pub fn advance_millis(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_millis(secs * 1_000);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SimTime {
        SimTime::from_millis(self.now.get())
    }
}
