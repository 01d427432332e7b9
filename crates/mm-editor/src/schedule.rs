//! Cancellable scheduled tasks polled against a `Clock`.
//!
//! Nothing here owns a timer. The session polls with the current time on
//! every tick and runs whatever came due, which keeps "last call wins"
//! deterministic under a manual clock.

/// Debounce: each `schedule` restarts the quiet period, and the task comes
/// due once, `delay_ms` after the last call.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    /// Drop the pending run. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Consume the pending run if its deadline has passed.
    pub fn take_due(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Fixed-rate repeating task. Missed periods collapse into one run.
#[derive(Debug, Clone)]
pub struct Interval {
    period_ms: f64,
    next_due: Option<f64>,
}

impl Interval {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            next_due: None,
        }
    }

    /// (Re)start the interval; the first run is one period from now.
    /// A non-positive period leaves the interval stopped.
    pub fn start(&mut self, now_ms: f64) {
        self.next_due = (self.period_ms > 0.0).then_some(now_ms + self.period_ms);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn take_due(&mut self, now_ms: f64) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now_ms < due {
            return false;
        }
        let mut next = due + self.period_ms;
        if next <= now_ms {
            next = now_ms + self.period_ms;
        }
        self.next_due = Some(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_call_wins() {
        let mut d = Debouncer::new(300.0);
        d.schedule(0.0);
        d.schedule(200.0);
        d.schedule(400.0);
        assert!(!d.take_due(650.0));
        assert!(d.take_due(700.0));
        // Fires once.
        assert!(!d.take_due(5000.0));
    }

    #[test]
    fn cancel_drops_pending_run() {
        let mut d = Debouncer::new(300.0);
        d.schedule(0.0);
        assert!(d.cancel());
        assert!(!d.cancel());
        assert!(!d.take_due(1000.0));
    }

    #[test]
    fn interval_runs_each_period() {
        let mut i = Interval::new(1000.0);
        assert!(!i.take_due(5000.0), "not started");
        i.start(0.0);
        assert!(!i.take_due(999.0));
        assert!(i.take_due(1000.0));
        assert!(!i.take_due(1500.0));
        assert!(i.take_due(2000.0));
    }

    #[test]
    fn interval_collapses_missed_periods() {
        let mut i = Interval::new(1000.0);
        i.start(0.0);
        assert!(i.take_due(10_500.0));
        assert!(!i.take_due(11_000.0));
        assert!(i.take_due(11_500.0));
    }

    #[test]
    fn zero_period_never_runs() {
        let mut i = Interval::new(0.0);
        i.start(0.0);
        assert!(!i.is_running());
        assert!(!i.take_due(1e9));
    }
}
