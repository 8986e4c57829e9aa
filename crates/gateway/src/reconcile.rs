//! Local-versus-remote order reconciliation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Difference between the ids an adapter tracks and the ids the venue reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Tracked locally, not reported by the venue
    pub missing_remote: Vec<String>,
    /// Reported by the venue, not tracked locally
    pub untracked_remote: Vec<String>,
}

impl ReconciliationReport {
    /// Both sides are deduplicated; the report lists are sorted
    pub fn diff<L, R>(local: L, remote: R) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let local: BTreeSet<String> = local.into_iter().map(Into::into).collect();
        let remote: BTreeSet<String> = remote.into_iter().map(Into::into).collect();
        Self {
            missing_remote: local.difference(&remote).cloned().collect(),
            untracked_remote: remote.difference(&local).cloned().collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.missing_remote.is_empty() && self.untracked_remote.is_empty()
    }
}
