//! Retry with exponential back-off and jitter
//!
//! Delay before retry `k` (0-indexed) is `min(base_delay * backoff^k, max_delay)`,
//! shifted by a uniform jitter in `[-jitter * delay, +jitter * delay]` and floored
//! at zero. Only [`AdapterError::Retryable`] failures are retried; fatal and
//! cancelled outcomes return on first occurrence.

use crate::cancel::CancelToken;
use crate::error::{AdapterError, ConfigError, Result};
use aegis_ports::Sleeper;
use log::{debug, warn};
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Back-off parameters shared by every retrying operation of an adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Multiplier applied per attempt
    pub backoff: f64,
    /// Fraction of the delay used as the jitter half-width, in `[0, 1]`
    pub jitter: f64,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            backoff: 2.0,
            jitter: 0.1,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Retry immediately, without any delay
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            backoff: 1.0,
            jitter: 0.0,
            max_delay: Duration::ZERO,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.backoff.is_finite() || self.backoff <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "retry backoff must be positive, got {}",
                self.backoff
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::Invalid(format!(
                "retry jitter must be within [0, 1], got {}",
                self.jitter
            )));
        }
        Ok(())
    }

    /// Delay before retry `attempt` without jitter
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let max = self.max_delay.as_secs_f64();
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_secs_f64() * self.backoff.powi(exponent);
        let capped = if raw.is_finite() { raw.min(max) } else { max };
        Duration::try_from_secs_f64(capped).unwrap_or(Duration::ZERO)
    }

    /// Delay before retry `attempt`, jitter applied
    pub fn next_delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let delay = self.base_delay_for(attempt);
        // NaN or infinite jitter would make the sampling range invalid
        if !self.jitter.is_finite() || self.jitter <= 0.0 || delay.is_zero() {
            return delay;
        }
        let secs = delay.as_secs_f64();
        let offset = rng.gen_range(-self.jitter..=self.jitter) * secs;
        Duration::try_from_secs_f64((secs + offset).max(0.0)).unwrap_or(Duration::ZERO)
    }
}

/// Run `operation` until it succeeds, fails fatally, or attempts run out
///
/// Each failure goes through `classify`. Cancellation is checked before every
/// attempt and before every sleep, and interrupts a sleep in progress. When
/// attempts are exhausted the last retryable error is returned.
pub async fn retry<T, E, F, Fut, C>(
    config: &RetryConfig,
    mut operation: F,
    classify: C,
    sleeper: &dyn Sleeper,
    cancel: Option<&CancelToken>,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    C: Fn(E) -> AdapterError,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(AdapterError::Cancelled);
        }

        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => classify(err),
        };
        if !error.is_retryable() {
            return Err(error);
        }

        attempt += 1;
        if attempt >= attempts {
            warn!("Giving up after {} attempts: {}", attempt, error);
            return Err(error);
        }

        let delay = config.next_delay(attempt - 1, &mut rand::thread_rng());
        warn!(
            "Attempt {}/{} failed: {} (retrying in {:?})",
            attempt, attempts, error, delay
        );

        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(AdapterError::Cancelled);
        }
        if delay.is_zero() {
            continue;
        }
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = sleeper.sleep(delay) => {}
                    _ = token.cancelled() => {
                        debug!("Back-off interrupted by cancellation");
                        return Err(AdapterError::Cancelled);
                    }
                }
            }
            None => sleeper.sleep(delay).await,
        }
    }
}

/// A [`RetryConfig`] bound to its sleeper and optional cancellation token
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    cancel: Option<CancelToken>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            config,
            sleeper,
            cancel: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn run<T, E, F, Fut, C>(&self, operation: F, classify: C) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        C: Fn(E) -> AdapterError,
    {
        retry(
            &self.config,
            operation,
            classify,
            self.sleeper.as_ref(),
            self.cancel.as_ref(),
        )
        .await
    }
}
