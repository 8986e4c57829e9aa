use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller- or adapter-assigned identifier of one logical order
///
/// Primary key of the idempotency cache: the same id always refers to the same
/// order payload for the lifetime of an adapter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Adapter-generated id: `{venue}-{sequence:06}`
    pub fn generated(venue: &str, sequence: u64) -> Self {
        Self(format!("{}-{:06}", venue, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientOrderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClientOrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ClientOrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
