use std::sync::Arc;

use proctor_config::{init_tracing, AppConfig};
use proctor_db::mirror::pg_repository::PgMirrorStore;
use proctor_db::synclog::pg_repository::PgSyncLogRepository;
use proctor_sync::client::{HallSourceClient, HallSourceConfig};
use proctor_sync::orchestrator::SyncOrchestrator;
use tokio_cron_scheduler::{Job, JobScheduler};

type Orchestrator = SyncOrchestrator<PgMirrorStore, PgSyncLogRepository>;

/// Cron expressions (seconds-resolution, six fields) and window length for
/// the two scheduled runs. Both are externalized so deployments can move
/// them without a rebuild.
#[derive(Debug, Clone)]
struct ScheduleConfig {
    facility_cron: String,
    participant_cron: String,
    window_days: u32,
}

impl ScheduleConfig {
    fn from_env() -> Self {
        Self {
            facility_cron: std::env::var("FACILITY_SYNC_CRON")
                .unwrap_or_else(|_| "0 0 2 * * *".to_string()),
            participant_cron: std::env::var("PARTICIPANT_SYNC_CRON")
                .unwrap_or_else(|_| "0 30 2 * * *".to_string()),
            window_days: std::env::var("PARTICIPANT_SYNC_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    let schedule = ScheduleConfig::from_env();
    tracing::info!(service = "proctor-scheduler", "starting");

    let pool = proctor_db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    let source_config = HallSourceConfig::from_env()
        .expect("HALL_SOURCE_BASE_URL and HALL_SOURCE_TOKEN must be set");
    let client = HallSourceClient::new(source_config).expect("failed to create source client");

    let orchestrator: Arc<Orchestrator> = Arc::new(SyncOrchestrator::new(
        client,
        PgMirrorStore::new(pool.clone()),
        PgSyncLogRepository::new(pool),
    ));

    let scheduler = JobScheduler::new()
        .await
        .expect("failed to create job scheduler");

    let facility_orchestrator = orchestrator.clone();
    let facility_job = Job::new_async(schedule.facility_cron.as_str(), move |_uuid, _lock| {
        let orchestrator = facility_orchestrator.clone();
        Box::pin(async move {
            match orchestrator.run_facility_sync().await {
                Ok(log) => tracing::info!(
                    run_id = %log.id,
                    created = log.records_created,
                    updated = log.records_updated,
                    "scheduled facility sync completed"
                ),
                Err(e) => tracing::error!(error = %e, "scheduled facility sync failed"),
            }
        })
    })
    .expect("invalid FACILITY_SYNC_CRON expression");
    scheduler
        .add(facility_job)
        .await
        .expect("failed to register facility job");

    let window_days = schedule.window_days;
    let participant_orchestrator = orchestrator.clone();
    let participant_job =
        Job::new_async(schedule.participant_cron.as_str(), move |_uuid, _lock| {
            let orchestrator = participant_orchestrator.clone();
            Box::pin(async move {
                let summary = orchestrator.run_participant_sync_window(window_days).await;
                tracing::info!(
                    attempted = summary.attempted,
                    completed = summary.completed,
                    failed = summary.failed,
                    "scheduled participant window finished"
                );
            })
        })
        .expect("invalid PARTICIPANT_SYNC_CRON expression");
    scheduler
        .add(participant_job)
        .await
        .expect("failed to register participant job");

    scheduler.start().await.expect("failed to start scheduler");
    tracing::info!(
        facility_cron = %schedule.facility_cron,
        participant_cron = %schedule.participant_cron,
        window_days = schedule.window_days,
        "scheduler running"
    );

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    tracing::info!("shutting down");
}
