use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{ExternalHall, ExternalRoom};
use proctor_common::error::ProctorResult;
use proctor_db::mirror::models::{Building, Room, SyncStatus};
use proctor_db::mirror::repositories::{MirrorStore, MirrorTx};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
    pub created: i32,
    pub updated: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FacilityReconcileSummary {
    pub halls: ReconcileCounts,
    pub rooms: ReconcileCounts,
    pub processed: usize,
}

/// Reconciles the externally-fetched hall feed into the Building/Room mirror.
///
/// The whole input batch is applied inside one transaction: either every
/// hall and room commits, or none do. Entities absent from the feed are left
/// untouched; the mirror never deletes.
pub struct FacilityReconciler<M: MirrorStore> {
    mirror: M,
}

impl<M: MirrorStore> FacilityReconciler<M> {
    pub fn new(mirror: M) -> Self {
        Self { mirror }
    }

    pub async fn reconcile(&self, halls: &[ExternalHall]) -> ProctorResult<FacilityReconcileSummary> {
        let mut tx = self.mirror.begin().await?;
        let now = Utc::now();
        let mut summary = FacilityReconcileSummary {
            processed: halls.len(),
            ..Default::default()
        };

        for hall in halls {
            let building_id =
                reconcile_building(tx.as_mut(), hall, now, &mut summary.halls).await?;

            for room in &hall.rooms {
                reconcile_room(tx.as_mut(), building_id, room, now, &mut summary.rooms).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            halls_created = summary.halls.created,
            halls_updated = summary.halls.updated,
            rooms_created = summary.rooms.created,
            rooms_updated = summary.rooms.updated,
            "facility reconciliation committed"
        );
        Ok(summary)
    }

    /// Reconcile pre-resolved per-building room batches (the flat
    /// `/hall-rooms/{id}` feed), all inside one transaction.
    pub async fn reconcile_rooms(
        &self,
        batches: &[(Uuid, Vec<ExternalRoom>)],
    ) -> ProctorResult<ReconcileCounts> {
        let mut tx = self.mirror.begin().await?;
        let now = Utc::now();
        let mut counts = ReconcileCounts::default();

        for (building_id, rooms) in batches {
            for room in rooms {
                reconcile_room(tx.as_mut(), *building_id, room, now, &mut counts).await?;
            }
        }

        tx.commit().await?;
        Ok(counts)
    }
}

/// Find-or-create by external id; the remote source is authoritative for
/// every mirrored field. Returns the local building id for room pinning.
async fn reconcile_building(
    tx: &mut dyn MirrorTx,
    hall: &ExternalHall,
    now: DateTime<Utc>,
    counts: &mut ReconcileCounts,
) -> ProctorResult<Uuid> {
    match tx.find_building_by_external_id(hall.id).await? {
        None => {
            let building = Building {
                id: Uuid::new_v4(),
                external_id: Some(hall.id),
                external_uid: Some(hall.uid.clone()),
                name: hall.name.clone(),
                address: hall.address.clone(),
                capacity: hall.capacity,
                region_id: hall.region_id,
                active: hall.active,
                last_synced_at: Some(now),
                sync_status: SyncStatus::Synced,
                sync_error: None,
                created_at: now,
                updated_at: now,
            };
            tx.insert_building(&building).await?;
            counts.created += 1;
            Ok(building.id)
        }
        Some(mut building) => {
            building.external_uid = Some(hall.uid.clone());
            building.name = hall.name.clone();
            building.address = hall.address.clone();
            building.capacity = hall.capacity;
            building.region_id = hall.region_id;
            building.active = hall.active;
            building.last_synced_at = Some(now);
            building.sync_status = SyncStatus::Synced;
            building.sync_error = None;
            tx.update_building(&building).await?;
            counts.updated += 1;
            Ok(building.id)
        }
    }
}

async fn reconcile_room(
    tx: &mut dyn MirrorTx,
    building_id: Uuid,
    room: &ExternalRoom,
    now: DateTime<Utc>,
    counts: &mut ReconcileCounts,
) -> ProctorResult<()> {
    match tx.find_room_by_external_id(room.id).await? {
        None => {
            let record = Room {
                id: Uuid::new_v4(),
                external_id: Some(room.id),
                building_id,
                name: room.name.clone(),
                capacity: room.capacity,
                active: room.active,
                last_synced_at: Some(now),
                sync_status: SyncStatus::Synced,
                sync_error: None,
                created_at: now,
                updated_at: now,
            };
            tx.insert_room(&record).await?;
            counts.created += 1;
        }
        Some(mut record) => {
            // building_id is re-pinned unconditionally; the source decides placement
            record.building_id = building_id;
            record.name = room.name.clone();
            record.capacity = room.capacity;
            record.active = room.active;
            record.last_synced_at = Some(now);
            record.sync_status = SyncStatus::Synced;
            record.sync_error = None;
            tx.update_room(&record).await?;
            counts.updated += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeMirror;

    fn hall(id: i64, name: &str, rooms: Vec<ExternalRoom>) -> ExternalHall {
        ExternalHall {
            id,
            uid: format!("HALL-{id}"),
            name: name.to_string(),
            address: Some("1 Exam St".to_string()),
            capacity: Some(200),
            region_id: Some(7),
            active: true,
            rooms,
        }
    }

    fn room(id: i64, name: &str) -> ExternalRoom {
        ExternalRoom {
            id,
            name: name.to_string(),
            capacity: Some(30),
            active: true,
        }
    }

    #[tokio::test]
    async fn first_sight_creates_building_and_room() {
        let mirror = FakeMirror::new();
        let reconciler = FacilityReconciler::new(mirror.clone());

        let summary = reconciler
            .reconcile(&[hall(1, "Hall A", vec![room(10, "R1")])])
            .await
            .expect("reconcile");

        assert_eq!(summary.halls, ReconcileCounts { created: 1, updated: 0 });
        assert_eq!(summary.rooms, ReconcileCounts { created: 1, updated: 0 });
        assert_eq!(summary.processed, 1);

        let state = mirror.snapshot();
        assert_eq!(state.buildings.len(), 1);
        assert_eq!(state.buildings[0].external_id, Some(1));
        assert_eq!(state.buildings[0].name, "Hall A");
        assert_eq!(state.buildings[0].sync_status, SyncStatus::Synced);
        assert_eq!(state.rooms.len(), 1);
        assert_eq!(state.rooms[0].external_id, Some(10));
        assert_eq!(state.rooms[0].building_id, state.buildings[0].id);
        assert_eq!(state.rooms[0].capacity, Some(30));
    }

    #[tokio::test]
    async fn unchanged_feed_is_idempotent() {
        let mirror = FakeMirror::new();
        let reconciler = FacilityReconciler::new(mirror.clone());
        let feed = vec![hall(1, "Hall A", vec![room(10, "R1")])];

        reconciler.reconcile(&feed).await.expect("first run");
        let before = mirror.snapshot();

        let summary = reconciler.reconcile(&feed).await.expect("second run");
        assert_eq!(summary.halls.created, 0);
        assert_eq!(summary.halls.updated, 1);
        assert_eq!(summary.rooms.created, 0);

        let after = mirror.snapshot();
        assert_eq!(after.buildings.len(), 1);
        assert_eq!(after.rooms.len(), 1);
        assert_eq!(after.buildings[0].id, before.buildings[0].id);
        assert_eq!(after.buildings[0].name, before.buildings[0].name);
        assert_eq!(after.rooms[0].id, before.rooms[0].id);
    }

    #[tokio::test]
    async fn changed_name_updates_same_row() {
        let mirror = FakeMirror::new();
        let reconciler = FacilityReconciler::new(mirror.clone());

        reconciler
            .reconcile(&[hall(1, "Hall A", vec![])])
            .await
            .expect("first run");
        let original_id = mirror.snapshot().buildings[0].id;

        reconciler
            .reconcile(&[hall(1, "Hall A (Renovated)", vec![])])
            .await
            .expect("second run");

        let state = mirror.snapshot();
        assert_eq!(state.buildings.len(), 1);
        assert_eq!(state.buildings[0].id, original_id);
        assert_eq!(state.buildings[0].name, "Hall A (Renovated)");
    }

    #[tokio::test]
    async fn room_is_repinned_when_source_moves_it() {
        let mirror = FakeMirror::new();
        let reconciler = FacilityReconciler::new(mirror.clone());

        reconciler
            .reconcile(&[
                hall(1, "Hall A", vec![room(10, "R1")]),
                hall(2, "Hall B", vec![]),
            ])
            .await
            .expect("first run");

        // the source now reports room 10 under hall 2
        reconciler
            .reconcile(&[
                hall(1, "Hall A", vec![]),
                hall(2, "Hall B", vec![room(10, "R1")]),
            ])
            .await
            .expect("second run");

        let state = mirror.snapshot();
        let hall_b = state
            .buildings
            .iter()
            .find(|b| b.external_id == Some(2))
            .unwrap();
        assert_eq!(state.rooms.len(), 1);
        assert_eq!(state.rooms[0].building_id, hall_b.id);
    }

    #[tokio::test]
    async fn failed_batch_commits_nothing() {
        let mirror = FakeMirror::new();
        let reconciler = FacilityReconciler::new(mirror.clone());

        // two writes succeed, the third (hall 3) fails
        mirror.fail_after_writes(2);
        let result = reconciler
            .reconcile(&[
                hall(1, "Hall A", vec![]),
                hall(2, "Hall B", vec![]),
                hall(3, "Hall C", vec![]),
            ])
            .await;

        assert!(result.is_err());
        let state = mirror.snapshot();
        assert!(state.buildings.is_empty());
        assert!(state.rooms.is_empty());
    }

    #[tokio::test]
    async fn absent_entities_are_left_untouched() {
        let mirror = FakeMirror::new();
        let reconciler = FacilityReconciler::new(mirror.clone());

        reconciler
            .reconcile(&[hall(1, "Hall A", vec![]), hall(2, "Hall B", vec![])])
            .await
            .expect("first run");

        // hall 2 disappears from the feed; its mirror row must survive
        reconciler
            .reconcile(&[hall(1, "Hall A", vec![])])
            .await
            .expect("second run");

        let state = mirror.snapshot();
        assert_eq!(state.buildings.len(), 2);
        assert!(state
            .buildings
            .iter()
            .any(|b| b.external_id == Some(2) && b.sync_status == SyncStatus::Synced));
    }

    #[tokio::test]
    async fn flat_room_batches_reconcile_pinned() {
        let mirror = FakeMirror::new();
        let reconciler = FacilityReconciler::new(mirror.clone());

        reconciler
            .reconcile(&[hall(1, "Hall A", vec![room(10, "R1")])])
            .await
            .expect("seed");
        let building_id = mirror.snapshot().buildings[0].id;

        let counts = reconciler
            .reconcile_rooms(&[(building_id, vec![room(10, "R1 renamed"), room(11, "R2")])])
            .await
            .expect("rooms run");

        assert_eq!(counts, ReconcileCounts { created: 1, updated: 1 });
        let state = mirror.snapshot();
        assert_eq!(state.rooms.len(), 2);
        assert!(state
            .rooms
            .iter()
            .all(|r| r.building_id == building_id));
    }
}
