use serde::Serialize;

use proctor_db::synclog::models::SyncLog;

#[derive(Debug, Serialize)]
pub struct FacilitySyncResponse {
    pub created: i32,
    pub updated: i32,
    pub duration_ms: i64,
}

impl From<&SyncLog> for FacilitySyncResponse {
    fn from(log: &SyncLog) -> Self {
        Self {
            created: log.records_created,
            updated: log.records_updated,
            duration_ms: log.duration_ms().unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipantSyncResponse {
    pub processed: i32,
    pub created: i32,
    pub updated: i32,
    pub skipped: i32,
    pub duration_ms: i64,
}

impl From<&SyncLog> for ParticipantSyncResponse {
    fn from(log: &SyncLog) -> Self {
        Self {
            processed: log.records_processed,
            created: log.records_created,
            updated: log.records_updated,
            skipped: log.records_errored,
            duration_ms: log.duration_ms().unwrap_or(0),
        }
    }
}

/// Acknowledgement for the fire-and-report window trigger; per-date results
/// land in the ledger, not in this response.
#[derive(Debug, Serialize)]
pub struct WindowAckResponse {
    pub accepted: bool,
    pub days: u32,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub data: Vec<SyncLog>,
    pub count: usize,
}
