use thiserror::Error;

use crate::client::HallSourceError;
use proctor_common::error::ProctorError;
use proctor_db::synclog::models::SyncType;

/// Run-level failure taxonomy for the orchestrator.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("external source error: {0}")]
    Source(#[from] HallSourceError),

    #[error("reconciliation error: {0}")]
    Reconcile(ProctorError),

    #[error("sync ledger error: {0}")]
    Ledger(ProctorError),

    #[error("{0} sync already in progress")]
    AlreadyRunning(SyncType),
}

impl SyncError {
    /// Structured payload for the ledger's `error_details` column.
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Source(HallSourceError::HttpError { status, body }) => serde_json::json!({
                "kind": "source_http",
                "status": status.as_u16(),
                "body": body,
            }),
            Self::Source(e) => serde_json::json!({
                "kind": "source_transport",
                "cause": e.to_string(),
            }),
            Self::Reconcile(e) => serde_json::json!({
                "kind": "reconcile",
                "cause": e.to_string(),
            }),
            Self::Ledger(e) => serde_json::json!({
                "kind": "ledger",
                "cause": e.to_string(),
            }),
            Self::AlreadyRunning(sync_type) => serde_json::json!({
                "kind": "already_running",
                "sync_type": sync_type.as_str(),
            }),
        }
    }
}
