//! Adapter settings loaded from JSON
//!
//! ```json
//! {
//!   "retry": {"max_attempts": 3, "base_delay_secs": 0.5, "backoff": 2.0,
//!             "jitter": 0.1, "max_delay_secs": 5.0},
//!   "rate_limit": {"max_calls": 180, "period_secs": 60.0}
//! }
//! ```
//!
//! Every field is optional. Without `rate_limit` the venue profile's default
//! limit applies.

use crate::error::ConfigError;
use crate::rate_limit::RateLimit;
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root settings for one venue adapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdapterSettings {
    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub rate_limit: Option<RateLimitSettings>,
}

/// Retry parameters with durations in (fractional) seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_secs: f64,
    pub backoff: f64,
    pub jitter: f64,
    pub max_delay_secs: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let config = RetryConfig::default();
        Self {
            max_attempts: config.max_attempts,
            base_delay_secs: config.base_delay.as_secs_f64(),
            backoff: config.backoff,
            jitter: config.jitter,
            max_delay_secs: config.max_delay.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub max_calls: usize,
    pub period_secs: f64,
}

fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigError::Invalid(format!("{} must be a non-negative number, got {}", field, value)))
}

impl AdapterSettings {
    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validated retry configuration
    pub fn retry_config(&self) -> Result<RetryConfig, ConfigError> {
        let config = RetryConfig {
            max_attempts: self.retry.max_attempts,
            base_delay: seconds("retry.base_delay_secs", self.retry.base_delay_secs)?,
            backoff: self.retry.backoff,
            jitter: self.retry.jitter,
            max_delay: seconds("retry.max_delay_secs", self.retry.max_delay_secs)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configured rate limit, if any
    pub fn rate_limit(&self) -> Result<Option<RateLimit>, ConfigError> {
        self.rate_limit
            .as_ref()
            .map(|limit| {
                let period = seconds("rate_limit.period_secs", limit.period_secs)?;
                Ok(RateLimit::new(limit.max_calls, period))
            })
            .transpose()
    }
}
