use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::mirror::models::{Building, Participant, Room};
use proctor_common::error::ProctorResult;

/// Handle to the mirror store. `begin` opens a transaction; every mutation
/// goes through the returned [`MirrorTx`], never through ad-hoc writes.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    async fn begin(&self) -> ProctorResult<Box<dyn MirrorTx>>;
}

/// One open transaction against the mirror. Dropping the handle without
/// calling `commit` rolls every staged write back.
#[async_trait]
pub trait MirrorTx: Send {
    async fn find_building_by_external_id(
        &mut self,
        external_id: i64,
    ) -> ProctorResult<Option<Building>>;

    /// Buildings under sync ownership, i.e. with a non-null external id.
    async fn list_mirrored_buildings(&mut self) -> ProctorResult<Vec<Building>>;

    async fn insert_building(&mut self, building: &Building) -> ProctorResult<()>;

    async fn update_building(&mut self, building: &Building) -> ProctorResult<()>;

    async fn find_room_by_external_id(&mut self, external_id: i64) -> ProctorResult<Option<Room>>;

    async fn insert_room(&mut self, room: &Room) -> ProctorResult<()>;

    async fn update_room(&mut self, room: &Room) -> ProctorResult<()>;

    async fn find_participant_by_slot(
        &mut self,
        building_id: Uuid,
        room_id: Uuid,
        exam_date: NaiveDate,
        start_time: NaiveTime,
    ) -> ProctorResult<Option<Participant>>;

    async fn insert_participant(&mut self, participant: &Participant) -> ProctorResult<()>;

    async fn update_participant(&mut self, participant: &Participant) -> ProctorResult<()>;

    async fn commit(self: Box<Self>) -> ProctorResult<()>;
}
