use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    SyncPending,
    SyncError,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::SyncPending => "sync_pending",
            Self::SyncError => "sync_error",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "synced" => Ok(Self::Synced),
            "sync_pending" => Ok(Self::SyncPending),
            "sync_error" => Ok(Self::SyncError),
            _ => Err(format!("unknown sync status: {value}")),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local mirror of an externally-owned exam hall.
///
/// `external_id` is `None` for locally created buildings; sync never touches
/// those. At most one row exists per non-null `external_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: Uuid,
    pub external_id: Option<i64>,
    pub external_uid: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub region_id: Option<i64>,
    pub active: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub sync_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A room inside a building. `building_id` always points at the building
/// whose `external_id` matched the parent hall in the latest sync pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub external_id: Option<i64>,
    pub building_id: Uuid,
    pub name: String,
    pub capacity: Option<i32>,
    pub active: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub sync_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Room occupancy for one exam time-slot on one date.
///
/// The reconciliation key is the tuple (building_id, room_id, exam_date,
/// start_time); the remote feed carries no per-record identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub building_id: Uuid,
    pub room_id: Uuid,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub participant_count: i32,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_status_round_trips_through_str() {
        for status in [SyncStatus::Synced, SyncStatus::SyncPending, SyncStatus::SyncError] {
            assert_eq!(SyncStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn sync_status_rejects_unknown() {
        assert!(SyncStatus::from_str("stale").is_err());
    }
}
