use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::TimeSlotOccupancy;
use proctor_common::error::ProctorResult;
use proctor_db::mirror::models::{Participant, SyncStatus};
use proctor_db::mirror::repositories::{MirrorStore, MirrorTx};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantReconcileSummary {
    pub processed: usize,
    pub created: i32,
    pub updated: i32,
    pub skipped: i32,
}

/// Reconciles one date's per-slot occupancy feed into Participant rows.
///
/// Keyed by (building, room, exam_date, start_time); the feed carries no
/// record ids. All writes for the date share one transaction. An occupancy
/// referencing an unknown hall or room is skipped with a warning; there is
/// no ordering guarantee that facility sync saw a brand-new room first.
pub struct ParticipantReconciler<M: MirrorStore> {
    mirror: M,
}

impl<M: MirrorStore> ParticipantReconciler<M> {
    pub fn new(mirror: M) -> Self {
        Self { mirror }
    }

    pub async fn reconcile(
        &self,
        exam_date: NaiveDate,
        slots: &[TimeSlotOccupancy],
    ) -> ProctorResult<ParticipantReconcileSummary> {
        let mut tx = self.mirror.begin().await?;
        let now = Utc::now();
        let mut summary = ParticipantReconcileSummary::default();

        for slot in slots {
            for occupancy in &slot.occupancies {
                summary.processed += 1;

                let building = tx
                    .find_building_by_external_id(occupancy.facility_external_id)
                    .await?;
                let room = tx.find_room_by_external_id(occupancy.room_external_id).await?;

                let (building, room) = match (building, room) {
                    (Some(b), Some(r)) => (b, r),
                    _ => {
                        tracing::warn!(
                            facility_external_id = occupancy.facility_external_id,
                            room_external_id = occupancy.room_external_id,
                            %exam_date,
                            "occupancy references unknown building/room, skipping"
                        );
                        summary.skipped += 1;
                        continue;
                    }
                };

                match tx
                    .find_participant_by_slot(building.id, room.id, exam_date, slot.start_time)
                    .await?
                {
                    None => {
                        let participant = Participant {
                            id: Uuid::new_v4(),
                            building_id: building.id,
                            room_id: room.id,
                            exam_date,
                            start_time: slot.start_time,
                            participant_count: occupancy.participant_count,
                            last_synced_at: Some(now),
                            sync_status: SyncStatus::Synced,
                            created_at: now,
                            updated_at: now,
                        };
                        tx.insert_participant(&participant).await?;
                        summary.created += 1;
                    }
                    Some(mut participant) => {
                        participant.participant_count = occupancy.participant_count;
                        participant.last_synced_at = Some(now);
                        participant.sync_status = SyncStatus::Synced;
                        tx.update_participant(&participant).await?;
                        summary.updated += 1;
                    }
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            %exam_date,
            processed = summary.processed,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "participant reconciliation committed"
        );
        Ok(summary)
    }
}
