use chrono::NaiveTime;
use serde::Deserialize;

/// An exam hall as served by the remote facility system (`/exam-halls`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalHall {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub region_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub rooms: Vec<ExternalRoom>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRoom {
    pub id: i64,
    pub name: String,
    pub capacity: Option<i32>,
    #[serde(default)]
    pub active: bool,
}

/// Participant counts for one exam start time on one date
/// (`/room-participants/{date}`). The feed carries no per-record id; the
/// (hall, room, date, start time) tuple is the identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotOccupancy {
    #[serde(deserialize_with = "deserialize_start_time")]
    pub start_time: NaiveTime,
    pub occupancies: Vec<RoomOccupancy>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOccupancy {
    pub facility_external_id: i64,
    pub room_external_id: i64,
    pub participant_count: i32,
}

// The remote system emits times as "HH:MM", occasionally with seconds.
fn deserialize_start_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
        .map_err(serde::de::Error::custom)
}
