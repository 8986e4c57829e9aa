//! Sliding-window rate limiter
//!
//! Keeps the timestamps of admitted calls. Before each admission check,
//! entries at or before `now - period` are evicted; the call is admitted when
//! fewer than `max_calls` remain. Evict-check-record runs under one lock, so
//! no trailing window of length `period` ever holds more than `max_calls`
//! admissions.

use crate::error::{ConfigError, RetryableError};
use aegis_ports::Clock;
use log::debug;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Capacity of a rate limiter: `max_calls` per `period`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_calls: usize,
    pub period: Duration,
}

impl RateLimit {
    pub const fn new(max_calls: usize, period: Duration) -> Self {
        Self { max_calls, period }
    }

    pub const fn per_second(max_calls: usize) -> Self {
        Self::new(max_calls, Duration::from_secs(1))
    }

    pub const fn per_minute(max_calls: usize) -> Self {
        Self::new(max_calls, Duration::from_secs(60))
    }
}

/// Call-admission guard shared by all operations of one adapter
pub struct RateLimiter {
    limit: RateLimit,
    clock: Arc<dyn Clock>,
    /// Admission instants, oldest first
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter; rejects a zero capacity or a zero period
    pub fn new(
        max_calls: usize,
        period: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        Self::from_limit(RateLimit::new(max_calls, period), clock)
    }

    pub fn from_limit(limit: RateLimit, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        if limit.max_calls == 0 || limit.period.is_zero() {
            return Err(ConfigError::Invalid(format!(
                "RateLimiter requires positive capacity and period, got {} calls per {:?}",
                limit.max_calls, limit.period
            )));
        }
        Ok(Self {
            limit,
            clock,
            window: Mutex::new(VecDeque::with_capacity(limit.max_calls)),
        })
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Record a permit, or fail with a retryable rate-limit error
    pub fn acquire(&self) -> Result<(), RetryableError> {
        let mut window = self.window.lock();
        // Read under the lock so the window stays in admission order
        let now = self.clock.now();
        Self::evict(&mut window, now, self.limit.period);

        if window.len() >= self.limit.max_calls {
            debug!(
                "Rate limit hit: {} calls in the last {:?}",
                window.len(),
                self.limit.period
            );
            return Err(RetryableError::RateLimitExceeded {
                max_calls: self.limit.max_calls,
                period: self.limit.period,
            });
        }
        window.push_back(now);
        Ok(())
    }

    /// Permits still available in the current window
    pub fn remaining(&self) -> usize {
        let mut window = self.window.lock();
        let now = self.clock.now();
        Self::evict(&mut window, now, self.limit.period);
        self.limit.max_calls.saturating_sub(window.len())
    }

    fn evict(window: &mut VecDeque<Instant>, now: Instant, period: Duration) {
        // Near process start `now - period` may not be representable; nothing is old enough then
        let Some(cutoff) = now.checked_sub(period) else {
            return;
        };
        while window.front().is_some_and(|admitted| *admitted <= cutoff) {
            window.pop_front();
        }
    }
}
