use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;

use proctor_db::synclog::repositories::SyncLogRepository;

use crate::error::ApiError;
use crate::sync::responses::{
    FacilitySyncResponse, ParticipantSyncResponse, SyncStatusResponse, WindowAckResponse,
};
use crate::AppState;

const WINDOW_DAYS: u32 = 3;

pub async fn trigger_exam_halls(
    State(state): State<AppState>,
) -> Result<Json<FacilitySyncResponse>, ApiError> {
    let log = state.orchestrator.run_facility_sync().await?;
    Ok(Json(FacilitySyncResponse::from(&log)))
}

pub async fn trigger_hall_rooms(
    State(state): State<AppState>,
) -> Result<Json<FacilitySyncResponse>, ApiError> {
    let log = state.orchestrator.run_room_sync().await?;
    Ok(Json(FacilitySyncResponse::from(&log)))
}

pub async fn trigger_participant_date(
    State(state): State<AppState>,
    Path(exam_date): Path<NaiveDate>,
) -> Result<Json<ParticipantSyncResponse>, ApiError> {
    let log = state.orchestrator.run_participant_sync(exam_date).await?;
    Ok(Json(ParticipantSyncResponse::from(&log)))
}

/// Fire-and-report: the window runs in a background task, outcomes are
/// queryable per date through `/sync/status` and the ledger.
pub async fn trigger_participant_window(
    State(state): State<AppState>,
) -> (StatusCode, Json<WindowAckResponse>) {
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        orchestrator.run_participant_sync_window(WINDOW_DAYS).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(WindowAckResponse {
            accepted: true,
            days: WINDOW_DAYS,
        }),
    )
}

pub async fn sync_status(
    State(state): State<AppState>,
) -> Result<Json<SyncStatusResponse>, ApiError> {
    let data = state.sync_log_repo.latest_per_type().await?;
    let count = data.len();
    Ok(Json(SyncStatusResponse { data, count }))
}
