use thiserror::Error;

/// Raw failure reported by a venue transport
///
/// This is the input of the per-venue error classifiers. Transports map
/// their client library's errors onto these variants without deciding
/// whether a retry is safe.
#[derive(Error, Debug)]
pub enum TransportFailure {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Venue error {code}: {message}")]
    Venue { code: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl TransportFailure {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn venue(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Venue {
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type TransportResult<T> = std::result::Result<T, TransportFailure>;
