use aegis_ports::Clock;
use std::time::Instant;

/// Real monotonic clock for production use
///
/// Backed by `std::time::Instant`, so wall-clock adjustments never move
/// rate-limit windows backwards.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
