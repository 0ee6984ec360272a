mod error;
mod sync;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use proctor_common::types::ServiceInfo;
use proctor_config::{init_tracing, AppConfig};
use proctor_db::mirror::pg_repository::PgMirrorStore;
use proctor_db::synclog::pg_repository::PgSyncLogRepository;
use proctor_sync::client::{HallSourceClient, HallSourceConfig};
use proctor_sync::orchestrator::SyncOrchestrator;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

pub type Orchestrator = SyncOrchestrator<PgMirrorStore, PgSyncLogRepository>;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub sync_log_repo: PgSyncLogRepository,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo::new("proctor-api"))
}

async fn metrics() -> impl IntoResponse {
    let body = "\
# HELP proctor_up Service up indicator\n\
# TYPE proctor_up gauge\n\
proctor_up 1\n\
# HELP proctor_info Service info\n\
# TYPE proctor_info gauge\n\
proctor_info{service=\"proctor-api\",version=\"0.1.0\"} 1\n";

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse::<HeaderValue>().unwrap(),
            "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/metrics", get(metrics))
        .merge(sync::router())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    tracing::info!(service = "proctor-api", "starting");

    let pool = proctor_db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    let source_config = HallSourceConfig::from_env()
        .expect("HALL_SOURCE_BASE_URL and HALL_SOURCE_TOKEN must be set");
    let client = HallSourceClient::new(source_config).expect("failed to create source client");

    let sync_log_repo = PgSyncLogRepository::new(pool.clone());
    let orchestrator = SyncOrchestrator::new(
        client,
        PgMirrorStore::new(pool.clone()),
        sync_log_repo.clone(),
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        sync_log_repo,
    };

    let app = build_router(state);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
