use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::synclog::models::{SyncCounters, SyncLog, SyncRunStatus, SyncType};
use crate::synclog::repositories::SyncLogRepository;
use proctor_common::error::{ProctorError, ProctorResult};

#[derive(Clone)]
pub struct PgSyncLogRepository {
    pool: PgPool,
}

const SYNC_LOG_COLUMNS: &str = "id, sync_type, status, started_at, completed_at, \
     records_processed, records_created, records_updated, records_deleted, records_errored, \
     error_message, error_details, metadata";

impl PgSyncLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: PgRow) -> ProctorResult<SyncLog> {
        let type_raw: String = row.get("sync_type");
        let sync_type = SyncType::from_str(&type_raw).map_err(ProctorError::Internal)?;
        let status_raw: String = row.get("status");
        let status = SyncRunStatus::from_str(&status_raw).map_err(ProctorError::Internal)?;

        Ok(SyncLog {
            id: row.get("id"),
            sync_type,
            status,
            started_at: row.get("started_at"),
            completed_at: row.get("completed_at"),
            records_processed: row.get("records_processed"),
            records_created: row.get("records_created"),
            records_updated: row.get("records_updated"),
            records_deleted: row.get("records_deleted"),
            records_errored: row.get("records_errored"),
            error_message: row.get("error_message"),
            error_details: row.get("error_details"),
            metadata: row.get("metadata"),
        })
    }
}

#[async_trait]
impl SyncLogRepository for PgSyncLogRepository {
    async fn start(
        &self,
        sync_type: SyncType,
        metadata: Option<serde_json::Value>,
    ) -> ProctorResult<Option<SyncLog>> {
        let row = sqlx::query(&format!(
            "insert into sync_logs (id, sync_type, status, started_at, metadata)
             select $1, $2, 'in_progress', $3, $4
             where not exists (
               select 1 from sync_logs where sync_type = $2 and status = 'in_progress'
             )
             returning {SYNC_LOG_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(sync_type.as_str())
        .bind(Utc::now())
        .bind(metadata)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::map_row(r)?)),
            None => Ok(None),
        }
    }

    async fn complete(&self, id: Uuid, counters: SyncCounters) -> ProctorResult<SyncLog> {
        let row = sqlx::query(&format!(
            "update sync_logs
             set status = 'completed', completed_at = $1,
                 records_processed = $2, records_created = $3, records_updated = $4,
                 records_deleted = $5, records_errored = $6
             where id = $7
             returning {SYNC_LOG_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(counters.processed)
        .bind(counters.created)
        .bind(counters.updated)
        .bind(counters.deleted)
        .bind(counters.errored)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        Self::map_row(row)
    }

    async fn fail(
        &self,
        id: Uuid,
        error_message: &str,
        error_details: Option<serde_json::Value>,
    ) -> ProctorResult<SyncLog> {
        let row = sqlx::query(&format!(
            "update sync_logs
             set status = 'failed', completed_at = $1, error_message = $2, error_details = $3
             where id = $4
             returning {SYNC_LOG_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(error_message)
        .bind(error_details)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        Self::map_row(row)
    }

    async fn latest_per_type(&self) -> ProctorResult<Vec<SyncLog>> {
        let rows = sqlx::query(&format!(
            "select distinct on (sync_type) {SYNC_LOG_COLUMNS}
             from sync_logs
             order by sync_type, started_at desc"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        rows.into_iter().map(Self::map_row).collect()
    }
}
