//! Append-only audit log of adapter operations

use aegis_core::{Payload, Timestamp};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SubmitOrder,
    CancelOrder,
    Reconcile,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::SubmitOrder => "submit_order",
            AuditAction::CancelOrder => "cancel_order",
            AuditAction::Reconcile => "reconcile",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the log, starting at 0
    pub sequence: u64,
    pub action: AuditAction,
    pub payload: Payload,
    pub response: Value,
    pub recorded_at: Timestamp,
}

/// Records are only ever appended; readers get a copy
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&self, action: AuditAction, payload: Payload, response: Value) {
        let mut records = self.records.lock();
        let sequence = records.len() as u64;
        records.push(AuditRecord {
            sequence,
            action,
            payload,
            response,
            recorded_at: Utc::now(),
        });
    }

    /// Snapshot of every record, oldest first
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
