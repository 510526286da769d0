//! Offline reconciliation rules.
//!
//! Clients keep a local copy of incomes, expenses, and receivables and push
//! their changes later. Each record carries a client-generated UUID and the
//! time it was last modified on the client. The newer write wins; on a tie
//! the server copy is kept.

use serde::Serialize;

use crate::types::Timestamp;

/// Maximum number of records accepted per table in one push.
pub const MAX_PUSH_RECORDS: usize = 500;

/// What to do with one pushed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// The server has never seen this record.
    Create,
    /// The client copy is newer; overwrite the server copy.
    Apply,
    /// The server copy is at least as new; ignore the client copy.
    KeepServer,
}

/// Decide how to reconcile a pushed record.
pub fn decide(
    incoming_updated_at: Timestamp,
    existing_updated_at: Option<Timestamp>,
) -> SyncDecision {
    match existing_updated_at {
        None => SyncDecision::Create,
        Some(server) if incoming_updated_at > server => SyncDecision::Apply,
        Some(_) => SyncDecision::KeepServer,
    }
}

/// Per-record result reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Created,
    Updated,
    Stale,
    Rejected,
}

impl From<SyncDecision> for SyncStatus {
    fn from(decision: SyncDecision) -> Self {
        match decision {
            SyncDecision::Create => SyncStatus::Created,
            SyncDecision::Apply => SyncStatus::Updated,
            SyncDecision::KeepServer => SyncStatus::Stale,
        }
    }
}

pub fn validate_batch_size(table: &str, len: usize) -> Result<(), String> {
    if len > MAX_PUSH_RECORDS {
        Err(format!(
            "Too many {table} in one push: {len} (maximum {MAX_PUSH_RECORDS})"
        ))
    } else {
        Ok(())
    }
}
