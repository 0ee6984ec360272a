use async_trait::async_trait;
use uuid::Uuid;

use crate::synclog::models::{SyncCounters, SyncLog, SyncType};
use proctor_common::error::ProctorResult;

#[async_trait]
pub trait SyncLogRepository: Send + Sync {
    /// Open a ledger entry with status IN_PROGRESS.
    ///
    /// Returns `None` without inserting when a run of the same type is
    /// already IN_PROGRESS (the insert-if-absent is a single atomic
    /// statement, so two overlapping starts cannot both win).
    async fn start(
        &self,
        sync_type: SyncType,
        metadata: Option<serde_json::Value>,
    ) -> ProctorResult<Option<SyncLog>>;

    /// Finalize a run as COMPLETED with its counters.
    async fn complete(&self, id: Uuid, counters: SyncCounters) -> ProctorResult<SyncLog>;

    /// Finalize a run as FAILED with an error message and structured details.
    async fn fail(
        &self,
        id: Uuid,
        error_message: &str,
        error_details: Option<serde_json::Value>,
    ) -> ProctorResult<SyncLog>;

    /// Most recent ledger entry per sync type.
    async fn latest_per_type(&self) -> ProctorResult<Vec<SyncLog>>;
}
