//! In-memory mirror store for engine and orchestrator tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use proctor_common::error::{ProctorError, ProctorResult};
use proctor_db::mirror::models::{Building, Participant, Room};
use proctor_db::mirror::repositories::{MirrorStore, MirrorTx};

#[derive(Debug, Default, Clone)]
pub struct MirrorState {
    pub buildings: Vec<Building>,
    pub rooms: Vec<Room>,
    pub participants: Vec<Participant>,
}

/// Transactional in-memory mirror: a transaction works on a copy of the
/// state and publishes it on commit; dropping the transaction discards it.
/// `fail_after_writes` injects a write failure mid-batch for atomicity tests.
#[derive(Clone, Default)]
pub struct FakeMirror {
    state: Arc<Mutex<MirrorState>>,
    fail_after_writes: Arc<Mutex<Option<usize>>>,
}

impl FakeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after_writes(&self, limit: usize) {
        *self.fail_after_writes.lock().unwrap() = Some(limit);
    }

    pub fn snapshot(&self) -> MirrorState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl MirrorStore for FakeMirror {
    async fn begin(&self) -> ProctorResult<Box<dyn MirrorTx>> {
        Ok(Box::new(FakeMirrorTx {
            store: self.clone(),
            staged: self.snapshot(),
            writes: 0,
            write_limit: *self.fail_after_writes.lock().unwrap(),
        }))
    }
}

pub struct FakeMirrorTx {
    store: FakeMirror,
    staged: MirrorState,
    writes: usize,
    write_limit: Option<usize>,
}

impl FakeMirrorTx {
    fn record_write(&mut self) -> ProctorResult<()> {
        if let Some(limit) = self.write_limit {
            if self.writes >= limit {
                return Err(ProctorError::Database("injected write failure".to_string()));
            }
        }
        self.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl MirrorTx for FakeMirrorTx {
    async fn find_building_by_external_id(
        &mut self,
        external_id: i64,
    ) -> ProctorResult<Option<Building>> {
        Ok(self
            .staged
            .buildings
            .iter()
            .find(|b| b.external_id == Some(external_id))
            .cloned())
    }

    async fn list_mirrored_buildings(&mut self) -> ProctorResult<Vec<Building>> {
        Ok(self
            .staged
            .buildings
            .iter()
            .filter(|b| b.external_id.is_some())
            .cloned()
            .collect())
    }

    async fn insert_building(&mut self, building: &Building) -> ProctorResult<()> {
        self.record_write()?;
        self.staged.buildings.push(building.clone());
        Ok(())
    }

    async fn update_building(&mut self, building: &Building) -> ProctorResult<()> {
        self.record_write()?;
        let slot = self
            .staged
            .buildings
            .iter_mut()
            .find(|b| b.id == building.id)
            .ok_or_else(|| ProctorError::NotFound(format!("building {}", building.id)))?;
        *slot = building.clone();
        Ok(())
    }

    async fn find_room_by_external_id(&mut self, external_id: i64) -> ProctorResult<Option<Room>> {
        Ok(self
            .staged
            .rooms
            .iter()
            .find(|r| r.external_id == Some(external_id))
            .cloned())
    }

    async fn insert_room(&mut self, room: &Room) -> ProctorResult<()> {
        self.record_write()?;
        self.staged.rooms.push(room.clone());
        Ok(())
    }

    async fn update_room(&mut self, room: &Room) -> ProctorResult<()> {
        self.record_write()?;
        let slot = self
            .staged
            .rooms
            .iter_mut()
            .find(|r| r.id == room.id)
            .ok_or_else(|| ProctorError::NotFound(format!("room {}", room.id)))?;
        *slot = room.clone();
        Ok(())
    }

    async fn find_participant_by_slot(
        &mut self,
        building_id: Uuid,
        room_id: Uuid,
        exam_date: NaiveDate,
        start_time: NaiveTime,
    ) -> ProctorResult<Option<Participant>> {
        Ok(self
            .staged
            .participants
            .iter()
            .find(|p| {
                p.building_id == building_id
                    && p.room_id == room_id
                    && p.exam_date == exam_date
                    && p.start_time == start_time
            })
            .cloned())
    }

    async fn insert_participant(&mut self, participant: &Participant) -> ProctorResult<()> {
        self.record_write()?;
        self.staged.participants.push(participant.clone());
        Ok(())
    }

    async fn update_participant(&mut self, participant: &Participant) -> ProctorResult<()> {
        self.record_write()?;
        let slot = self
            .staged
            .participants
            .iter_mut()
            .find(|p| p.id == participant.id)
            .ok_or_else(|| ProctorError::NotFound(format!("participant {}", participant.id)))?;
        *slot = participant.clone();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> ProctorResult<()> {
        *self.store.state.lock().unwrap() = self.staged;
        Ok(())
    }
}
