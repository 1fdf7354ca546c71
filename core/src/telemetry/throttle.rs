use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A failure site: the entity type reporting and the operation it was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Site {
    pub source: &'static str,
    pub operation: &'static str,
}

impl Site {
    pub const fn new(source: &'static str, operation: &'static str) -> Self {
        Self { source, operation }
    }
}

/// Time source for the throttle.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Gate that lets at most one diagnostic per site through per interval.
pub struct DiagnosticThrottle {
    interval: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<ThrottleState>,
}

#[derive(Default)]
struct ThrottleState {
    last_emitted: HashMap<Site, Instant>,
    emitted: usize,
    suppressed: usize,
}

impl DiagnosticThrottle {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Arc::new(SystemClock))
    }

    pub fn with_clock(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            interval,
            clock,
            inner: Mutex::new(ThrottleState::default()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true when a diagnostic for `site` may be emitted now, and
    /// records the emission.
    pub fn permit(&self, site: Site) -> bool {
        let now = self.clock.now();
        let mut state = self.state();
        let allowed = match state.last_emitted.get(&site) {
            Some(last) => now.saturating_duration_since(*last) >= self.interval,
            None => true,
        };
        if allowed {
            state.last_emitted.insert(site, now);
            state.emitted += 1;
        } else {
            state.suppressed += 1;
        }
        allowed
    }

    /// Forgets every site and zeroes the counters.
    pub fn reset(&self) {
        *self.state() = ThrottleState::default();
    }

    /// (emitted, suppressed) since construction or the last reset.
    pub fn snapshot(&self) -> (usize, usize) {
        let state = self.state();
        (state.emitted, state.suppressed)
    }

    // A panicking sink must not disable the gate for every other thread.
    fn state(&self) -> MutexGuard<'_, ThrottleState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for DiagnosticThrottle {
    fn default() -> Self {
        Self::new(super::DEFAULT_THROTTLE_INTERVAL)
    }
}
