use std::time::{Duration, Instant};

pub const DEFAULT_REINIT_WINDOW: Duration = Duration::from_millis(100);

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Collapses repeated schedules inside one window into a single trailing run.
///
/// The owner polls [`ReinitThrottle::take_due`] from its event loop and runs
/// the reconciliation on itself when it reports `true`.
#[derive(Debug, Clone)]
pub struct ReinitThrottle {
    window: Duration,
    deadline: Option<Instant>,
}

impl Default for ReinitThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_REINIT_WINDOW)
    }
}

impl ReinitThrottle {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` when this call opened a new window.
    pub fn schedule(&mut self, now: Instant) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + self.window);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
