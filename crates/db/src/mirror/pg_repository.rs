use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::mirror::models::{Building, Participant, Room, SyncStatus};
use crate::mirror::repositories::{MirrorStore, MirrorTx};
use proctor_common::error::{ProctorError, ProctorResult};

#[derive(Clone)]
pub struct PgMirrorStore {
    pool: PgPool,
}

impl PgMirrorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MirrorStore for PgMirrorStore {
    async fn begin(&self) -> ProctorResult<Box<dyn MirrorTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ProctorError::Database(e.to_string()))?;
        Ok(Box::new(PgMirrorTx { tx }))
    }
}

pub struct PgMirrorTx {
    tx: Transaction<'static, Postgres>,
}

const BUILDING_COLUMNS: &str = "id, external_id, external_uid, name, address, capacity, region_id, \
     active, last_synced_at, sync_status, sync_error, created_at, updated_at";

const ROOM_COLUMNS: &str = "id, external_id, building_id, name, capacity, active, last_synced_at, \
     sync_status, sync_error, created_at, updated_at";

const PARTICIPANT_COLUMNS: &str = "id, building_id, room_id, exam_date, start_time, \
     participant_count, last_synced_at, sync_status, created_at, updated_at";

fn map_building_row(row: PgRow) -> ProctorResult<Building> {
    let status_raw: String = row.get("sync_status");
    let sync_status = SyncStatus::from_str(&status_raw).map_err(ProctorError::Internal)?;

    Ok(Building {
        id: row.get("id"),
        external_id: row.get("external_id"),
        external_uid: row.get("external_uid"),
        name: row.get("name"),
        address: row.get("address"),
        capacity: row.get("capacity"),
        region_id: row.get("region_id"),
        active: row.get("active"),
        last_synced_at: row.get("last_synced_at"),
        sync_status,
        sync_error: row.get("sync_error"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_room_row(row: PgRow) -> ProctorResult<Room> {
    let status_raw: String = row.get("sync_status");
    let sync_status = SyncStatus::from_str(&status_raw).map_err(ProctorError::Internal)?;

    Ok(Room {
        id: row.get("id"),
        external_id: row.get("external_id"),
        building_id: row.get("building_id"),
        name: row.get("name"),
        capacity: row.get("capacity"),
        active: row.get("active"),
        last_synced_at: row.get("last_synced_at"),
        sync_status,
        sync_error: row.get("sync_error"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_participant_row(row: PgRow) -> ProctorResult<Participant> {
    let status_raw: String = row.get("sync_status");
    let sync_status = SyncStatus::from_str(&status_raw).map_err(ProctorError::Internal)?;

    Ok(Participant {
        id: row.get("id"),
        building_id: row.get("building_id"),
        room_id: row.get("room_id"),
        exam_date: row.get("exam_date"),
        start_time: row.get("start_time"),
        participant_count: row.get("participant_count"),
        last_synced_at: row.get("last_synced_at"),
        sync_status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl MirrorTx for PgMirrorTx {
    async fn find_building_by_external_id(
        &mut self,
        external_id: i64,
    ) -> ProctorResult<Option<Building>> {
        let row = sqlx::query(&format!(
            "select {BUILDING_COLUMNS} from buildings where external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(map_building_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_mirrored_buildings(&mut self) -> ProctorResult<Vec<Building>> {
        let rows = sqlx::query(&format!(
            "select {BUILDING_COLUMNS} from buildings where external_id is not null \
             order by external_id"
        ))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        rows.into_iter().map(map_building_row).collect()
    }

    async fn insert_building(&mut self, building: &Building) -> ProctorResult<()> {
        sqlx::query(
            "insert into buildings
             (id, external_id, external_uid, name, address, capacity, region_id,
              active, last_synced_at, sync_status, sync_error, created_at, updated_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now(), now())",
        )
        .bind(building.id)
        .bind(building.external_id)
        .bind(&building.external_uid)
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.capacity)
        .bind(building.region_id)
        .bind(building.active)
        .bind(building.last_synced_at)
        .bind(building.sync_status.as_str())
        .bind(&building.sync_error)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;
        Ok(())
    }

    async fn update_building(&mut self, building: &Building) -> ProctorResult<()> {
        sqlx::query(
            "update buildings
             set external_uid = $1, name = $2, address = $3, capacity = $4, region_id = $5,
                 active = $6, last_synced_at = $7, sync_status = $8, sync_error = $9,
                 updated_at = now()
             where id = $10",
        )
        .bind(&building.external_uid)
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.capacity)
        .bind(building.region_id)
        .bind(building.active)
        .bind(building.last_synced_at)
        .bind(building.sync_status.as_str())
        .bind(&building.sync_error)
        .bind(building.id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;
        Ok(())
    }

    async fn find_room_by_external_id(&mut self, external_id: i64) -> ProctorResult<Option<Room>> {
        let row = sqlx::query(&format!(
            "select {ROOM_COLUMNS} from rooms where external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(map_room_row(r)?)),
            None => Ok(None),
        }
    }

    async fn insert_room(&mut self, room: &Room) -> ProctorResult<()> {
        sqlx::query(
            "insert into rooms
             (id, external_id, building_id, name, capacity, active, last_synced_at,
              sync_status, sync_error, created_at, updated_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())",
        )
        .bind(room.id)
        .bind(room.external_id)
        .bind(room.building_id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(room.active)
        .bind(room.last_synced_at)
        .bind(room.sync_status.as_str())
        .bind(&room.sync_error)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;
        Ok(())
    }

    async fn update_room(&mut self, room: &Room) -> ProctorResult<()> {
        sqlx::query(
            "update rooms
             set building_id = $1, name = $2, capacity = $3, active = $4,
                 last_synced_at = $5, sync_status = $6, sync_error = $7, updated_at = now()
             where id = $8",
        )
        .bind(room.building_id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(room.active)
        .bind(room.last_synced_at)
        .bind(room.sync_status.as_str())
        .bind(&room.sync_error)
        .bind(room.id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;
        Ok(())
    }

    async fn find_participant_by_slot(
        &mut self,
        building_id: Uuid,
        room_id: Uuid,
        exam_date: NaiveDate,
        start_time: NaiveTime,
    ) -> ProctorResult<Option<Participant>> {
        let row = sqlx::query(&format!(
            "select {PARTICIPANT_COLUMNS} from participants
             where building_id = $1 and room_id = $2 and exam_date = $3 and start_time = $4"
        ))
        .bind(building_id)
        .bind(room_id)
        .bind(exam_date)
        .bind(start_time)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(map_participant_row(r)?)),
            None => Ok(None),
        }
    }

    async fn insert_participant(&mut self, participant: &Participant) -> ProctorResult<()> {
        sqlx::query(
            "insert into participants
             (id, building_id, room_id, exam_date, start_time, participant_count,
              last_synced_at, sync_status, created_at, updated_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, now(), now())",
        )
        .bind(participant.id)
        .bind(participant.building_id)
        .bind(participant.room_id)
        .bind(participant.exam_date)
        .bind(participant.start_time)
        .bind(participant.participant_count)
        .bind(participant.last_synced_at)
        .bind(participant.sync_status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;
        Ok(())
    }

    async fn update_participant(&mut self, participant: &Participant) -> ProctorResult<()> {
        sqlx::query(
            "update participants
             set participant_count = $1, last_synced_at = $2, sync_status = $3, updated_at = now()
             where id = $4",
        )
        .bind(participant.participant_count)
        .bind(participant.last_synced_at)
        .bind(participant.sync_status.as_str())
        .bind(participant.id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| ProctorError::Database(e.to_string()))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> ProctorResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| ProctorError::Database(e.to_string()))
    }
}
