//! Time source for debounce, autosave and animation.
//!
//! Everything time-dependent in the editor reads milliseconds from a `Clock`
//! instead of the wall clock, so tests drive timers with `ManualClock`.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub trait Clock {
    /// Milliseconds on a monotonic-enough timeline. Only differences matter.
    fn now_ms(&self) -> f64;
}

/// Monotonic clock for native builds, measured from construction.
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
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock. Clones share the same time, so a test keeps one handle
/// while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
