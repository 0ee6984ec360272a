use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::client::HallSourceClient;
use crate::error::SyncError;
use crate::facilities::FacilityReconciler;
use crate::participants::ParticipantReconciler;
use proctor_common::error::ProctorResult;
use proctor_db::mirror::models::Building;
use proctor_db::mirror::repositories::{MirrorStore, MirrorTx};
use proctor_db::synclog::models::{SyncCounters, SyncLog, SyncType};
use proctor_db::synclog::repositories::SyncLogRepository;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSummary {
    pub attempted: u32,
    pub completed: u32,
    pub failed: u32,
}

/// Drives full sync runs: opens a ledger entry, fetches from the remote
/// source, hands the batch to the reconciliation engine, finalizes the
/// ledger entry with outcome and counters. Every run either COMPLETES with
/// its counters or FAILS with the triggering error re-raised; the mirror is
/// only ever touched through the reconcilers' transaction scope.
pub struct SyncOrchestrator<M, L>
where
    M: MirrorStore + Clone,
    L: SyncLogRepository,
{
    client: HallSourceClient,
    mirror: M,
    facilities: FacilityReconciler<M>,
    participants: ParticipantReconciler<M>,
    ledger: L,
}

impl<M, L> SyncOrchestrator<M, L>
where
    M: MirrorStore + Clone,
    L: SyncLogRepository,
{
    pub fn new(client: HallSourceClient, mirror: M, ledger: L) -> Self {
        Self {
            facilities: FacilityReconciler::new(mirror.clone()),
            participants: ParticipantReconciler::new(mirror.clone()),
            client,
            mirror,
            ledger,
        }
    }

    /// Full facility sync: `/exam-halls` feed into the Building/Room mirror.
    pub async fn run_facility_sync(&self) -> Result<SyncLog, SyncError> {
        let log = self.open_ledger(SyncType::ExamHalls, None).await?;
        tracing::info!(run_id = %log.id, "facility sync started");

        let halls = match self.client.fetch_exam_halls().await {
            Ok(halls) => halls,
            Err(e) => return Err(self.fail_run(log.id, e.into()).await),
        };
        tracing::info!(count = halls.len(), "fetched exam halls");

        let summary = match self.facilities.reconcile(&halls).await {
            Ok(summary) => summary,
            Err(e) => return Err(self.fail_run(log.id, SyncError::Reconcile(e)).await),
        };

        let counters = SyncCounters {
            processed: summary.processed as i32,
            created: summary.halls.created,
            updated: summary.halls.updated,
            deleted: 0,
            errored: 0,
        };
        let log = self
            .ledger
            .complete(log.id, counters)
            .await
            .map_err(SyncError::Ledger)?;
        tracing::info!(
            run_id = %log.id,
            created = counters.created,
            updated = counters.updated,
            "facility sync completed"
        );
        Ok(log)
    }

    /// Per-hall room sync: `/hall-rooms/{id}` for every mirrored building,
    /// reconciled in one transaction.
    pub async fn run_room_sync(&self) -> Result<SyncLog, SyncError> {
        let log = self.open_ledger(SyncType::HallRooms, None).await?;
        tracing::info!(run_id = %log.id, "room sync started");

        let buildings = match self.list_mirrored_buildings().await {
            Ok(buildings) => buildings,
            Err(e) => return Err(self.fail_run(log.id, SyncError::Reconcile(e)).await),
        };

        let mut batches = Vec::with_capacity(buildings.len());
        for building in &buildings {
            let Some(external_id) = building.external_id else {
                continue;
            };
            match self.client.fetch_hall_rooms(external_id).await {
                Ok(rooms) => batches.push((building.id, rooms)),
                Err(e) => return Err(self.fail_run(log.id, e.into()).await),
            }
        }
        let processed: usize = batches.iter().map(|(_, rooms)| rooms.len()).sum();

        let counts = match self.facilities.reconcile_rooms(&batches).await {
            Ok(counts) => counts,
            Err(e) => return Err(self.fail_run(log.id, SyncError::Reconcile(e)).await),
        };

        let counters = SyncCounters {
            processed: processed as i32,
            created: counts.created,
            updated: counts.updated,
            deleted: 0,
            errored: 0,
        };
        let log = self
            .ledger
            .complete(log.id, counters)
            .await
            .map_err(SyncError::Ledger)?;
        tracing::info!(run_id = %log.id, halls = buildings.len(), rooms = processed, "room sync completed");
        Ok(log)
    }

    /// Single-date participant sync: `/room-participants/{date}` into
    /// Participant rows, one transaction for the whole date.
    pub async fn run_participant_sync(&self, exam_date: NaiveDate) -> Result<SyncLog, SyncError> {
        let metadata = serde_json::json!({ "exam_date": exam_date.to_string() });
        let log = self
            .open_ledger(SyncType::Participants, Some(metadata))
            .await?;
        tracing::info!(run_id = %log.id, %exam_date, "participant sync started");

        let slots = match self.client.fetch_room_participants(exam_date).await {
            Ok(slots) => slots,
            Err(e) => return Err(self.fail_run(log.id, e.into()).await),
        };

        let summary = match self.participants.reconcile(exam_date, &slots).await {
            Ok(summary) => summary,
            Err(e) => return Err(self.fail_run(log.id, SyncError::Reconcile(e)).await),
        };

        let counters = SyncCounters {
            processed: summary.processed as i32,
            created: summary.created,
            updated: summary.updated,
            deleted: 0,
            errored: summary.skipped,
        };
        let log = self
            .ledger
            .complete(log.id, counters)
            .await
            .map_err(SyncError::Ledger)?;
        tracing::info!(run_id = %log.id, %exam_date, "participant sync completed");
        Ok(log)
    }

    /// Participant sync over `days` consecutive dates starting today,
    /// sequentially. One date's failure is logged and does not stop later
    /// dates. Isolation between dates is deliberate, distinct from the
    /// all-or-nothing transaction within a single date.
    pub async fn run_participant_sync_window(&self, days: u32) -> WindowSummary {
        let today = Utc::now().date_naive();
        let mut summary = WindowSummary::default();

        for offset in 0..days {
            let exam_date = today + Duration::days(i64::from(offset));
            summary.attempted += 1;
            match self.run_participant_sync(exam_date).await {
                Ok(log) => {
                    summary.completed += 1;
                    tracing::info!(%exam_date, run_id = %log.id, "window date completed");
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(%exam_date, error = %e, "window date failed, continuing");
                }
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            completed = summary.completed,
            failed = summary.failed,
            "participant sync window finished"
        );
        summary
    }

    async fn open_ledger(
        &self,
        sync_type: SyncType,
        metadata: Option<serde_json::Value>,
    ) -> Result<SyncLog, SyncError> {
        self.ledger
            .start(sync_type, metadata)
            .await
            .map_err(SyncError::Ledger)?
            .ok_or(SyncError::AlreadyRunning(sync_type))
    }

    /// Finalize the ledger entry as FAILED and hand the original error back
    /// to the caller. A ledger write failure here must not mask it.
    async fn fail_run(&self, id: Uuid, err: SyncError) -> SyncError {
        if let Err(ledger_err) = self
            .ledger
            .fail(id, &err.to_string(), Some(err.details()))
            .await
        {
            tracing::error!(run_id = %id, error = %ledger_err, "could not finalize ledger entry");
        }
        err
    }

    async fn list_mirrored_buildings(&self) -> ProctorResult<Vec<Building>> {
        // read-only lookup; the dropped transaction rolls back harmlessly
        let mut tx = self.mirror.begin().await?;
        tx.list_mirrored_buildings().await
    }
}
