//! Per-venue error classification
//!
//! Each venue gets a pure function from a raw [`TransportFailure`] to an
//! [`AdapterError`]. Only failures plausibly caused by transient
//! infrastructure are retryable: timeouts, connection and I/O errors,
//! explicit rate-limit signals and venue server errors. Everything else,
//! including failures nobody recognises, is fatal.

use crate::error::{AdapterError, FatalError, RetryableError};
use aegis_ports::TransportFailure;

/// Signature shared by the venue classifiers
pub type Classifier = fn(&TransportFailure) -> AdapterError;

/// Error raised inside a retried operation
///
/// Operations fail either with a raw transport failure, which still needs
/// classifying, or with an error the adapter already classified (a rate
/// limiter rejection, for instance), which passes through unchanged.
#[derive(Debug)]
pub enum AttemptError {
    Transport(TransportFailure),
    Classified(AdapterError),
}

impl AttemptError {
    /// Classify with `classifier`; already-classified errors are returned as-is
    pub fn classify(self, classifier: Classifier) -> AdapterError {
        match self {
            AttemptError::Transport(failure) => classifier(&failure),
            AttemptError::Classified(error) => error,
        }
    }
}

impl From<TransportFailure> for AttemptError {
    fn from(failure: TransportFailure) -> Self {
        AttemptError::Transport(failure)
    }
}

impl From<AdapterError> for AttemptError {
    fn from(error: AdapterError) -> Self {
        AttemptError::Classified(error)
    }
}

impl From<RetryableError> for AttemptError {
    fn from(error: RetryableError) -> Self {
        AttemptError::Classified(error.into())
    }
}

fn transient(failure: &TransportFailure) -> AdapterError {
    RetryableError::Transient(failure.to_string()).into()
}

fn fatal(failure: &TransportFailure) -> AdapterError {
    FatalError::Rejected(failure.to_string()).into()
}

fn unavailable(status: impl ToString, message: &str) -> AdapterError {
    RetryableError::VenueUnavailable {
        status: status.to_string(),
        message: message.to_string(),
    }
    .into()
}

/// Transport-level failures, identical for every venue
fn classify_transport(failure: &TransportFailure) -> Option<AdapterError> {
    match failure {
        TransportFailure::Timeout(_)
        | TransportFailure::Connection(_)
        | TransportFailure::Io(_) => Some(transient(failure)),
        TransportFailure::Other(message) => {
            Some(FatalError::Unclassified(message.clone()).into())
        }
        TransportFailure::Http { .. } | TransportFailure::Venue { .. } => None,
    }
}

fn classify_http(status: u16, message: &str, failure: &TransportFailure) -> AdapterError {
    if status == 429 || status >= 500 {
        unavailable(status, message)
    } else {
        fatal(failure)
    }
}

/// Alpaca: HTTP 429 and 5xx retry; any other API error is a rejection
pub fn classify_alpaca(failure: &TransportFailure) -> AdapterError {
    if let Some(error) = classify_transport(failure) {
        return error;
    }
    match failure {
        TransportFailure::Http { status, message } => classify_http(*status, message, failure),
        _ => fatal(failure),
    }
}

/// OANDA v20: the `RATE_LIMIT` code, HTTP 429 and 5xx retry
pub fn classify_oanda(failure: &TransportFailure) -> AdapterError {
    if let Some(error) = classify_transport(failure) {
        return error;
    }
    match failure {
        TransportFailure::Venue { code, message } if code == "RATE_LIMIT" => {
            unavailable(code, message)
        }
        // v20 errors sometimes carry the HTTP status as their code
        TransportFailure::Venue { code, message }
            if code.parse::<u16>().is_ok_and(|status| status >= 500) =>
        {
            unavailable(code, message)
        }
        TransportFailure::Http { status, message } => classify_http(*status, message, failure),
        _ => fatal(failure),
    }
}

/// ccxt exception classes that denote network or throttling trouble
const CCXT_RETRYABLE: &[&str] = &[
    "NetworkError",
    "RequestTimeout",
    "ExchangeNotAvailable",
    "DDoSProtection",
    "RateLimitExceeded",
];

/// CCXT: network-family and rate-limit exception classes retry, other
/// exchange errors are rejections
pub fn classify_ccxt(failure: &TransportFailure) -> AdapterError {
    if let Some(error) = classify_transport(failure) {
        return error;
    }
    match failure {
        TransportFailure::Venue { code, message } if CCXT_RETRYABLE.contains(&code.as_str()) => {
            unavailable(code, message)
        }
        TransportFailure::Http { status, message } => classify_http(*status, message, failure),
        _ => fatal(failure),
    }
}
