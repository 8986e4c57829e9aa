//! Error types for the gateway crate

use aegis_core::ClientOrderId;
use std::time::Duration;
use thiserror::Error;

/// Transient failures: safe to retry, surfaced only once attempts run out
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryableError {
    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Rate limit exceeded: {max_calls} calls per {period:?}")]
    RateLimitExceeded { max_calls: usize, period: Duration },

    #[error("Venue unavailable ({status}): {message}")]
    VenueUnavailable { status: String, message: String },
}

/// Terminal failures: propagated on first occurrence, never retried
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    #[error("Unknown client id {0}")]
    UnknownClientId(ClientOrderId),

    #[error("client_id {0} reused with different payload")]
    OrderConflict(ClientOrderId),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Venue rejected request: {0}")]
    Rejected(String),

    #[error("Cached order {0} has no venue order id")]
    MissingVenueOrderId(ClientOrderId),

    #[error("Unclassified failure: {0}")]
    Unclassified(String),
}

/// Root of the adapter failure taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error(transparent)]
    Retryable(#[from] RetryableError),

    #[error(transparent)]
    Fatal(#[from] FatalError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AdapterError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdapterError::Retryable(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AdapterError::Fatal(_))
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;

/// Construction-time configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
