use aegis_ports::Clock;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Clock that only moves when told to
///
/// Time is frozen at construction and advances exclusively through
/// [`ManualClock::advance`], which makes sliding-window tests deterministic.
pub struct ManualClock {
    /// Real instant captured at construction
    origin: Instant,
    /// Simulated time elapsed since `origin`
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        })
    }

    /// Advance the simulated time by a specified duration
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Simulated time elapsed since construction
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock()
    }
}
