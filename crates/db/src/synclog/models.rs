use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    ExamHalls,
    HallRooms,
    Participants,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExamHalls => "exam_halls",
            Self::HallRooms => "hall_rooms",
            Self::Participants => "participants",
        }
    }
}

impl FromStr for SyncType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "exam_halls" => Ok(Self::ExamHalls),
            "hall_rooms" => Ok(Self::HallRooms),
            "participants" => Ok(Self::Participants),
            _ => Err(format!("unknown sync type: {value}")),
        }
    }
}

impl fmt::Display for SyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncRunStatus {
    InProgress,
    Completed,
    Failed,
}

impl SyncRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for SyncRunStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown sync run status: {value}")),
        }
    }
}

/// Final record counts for one sync run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncCounters {
    pub processed: i32,
    pub created: i32,
    pub updated: i32,
    pub deleted: i32,
    pub errored: i32,
}

/// One row per sync attempt. Inserted IN_PROGRESS at run start, finalized
/// exactly once to COMPLETED or FAILED, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLog {
    pub id: Uuid,
    pub sync_type: SyncType,
    pub status: SyncRunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i32,
    pub records_created: i32,
    pub records_updated: i32,
    pub records_deleted: i32,
    pub records_errored: i32,
    pub error_message: Option<String>,
    pub error_details: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

impl SyncLog {
    /// Wall-clock duration of a finalized run, in milliseconds.
    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.started_at).num_milliseconds())
    }
}
