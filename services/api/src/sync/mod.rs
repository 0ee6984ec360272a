pub mod handlers;
pub mod responses;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync/exam-halls", post(handlers::trigger_exam_halls))
        .route("/sync/hall-rooms", post(handlers::trigger_hall_rooms))
        .route(
            "/sync/participants/next-3-days",
            post(handlers::trigger_participant_window),
        )
        .route(
            "/sync/participants/{date}",
            post(handlers::trigger_participant_date),
        )
        .route("/sync/status", get(handlers::sync_status))
}
