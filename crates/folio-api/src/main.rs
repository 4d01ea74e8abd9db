use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use folio_api::config::{ApiConfig, LogFormat};
use folio_api::telemetry::{init_logging, telemetry_mirror};
use folio_api::{build_rate_limiter, build_router, AppState};
use folio_core::{defaults, EventBus, StagingArea};
use folio_db::{log_pool_metrics, Database, PoolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    let _file_guard = init_logging(&config.log);

    let log_format = match config.log.format {
        LogFormat::Json => "json",
        LogFormat::Text => "text",
    };
    info!(
        log_format,
        log_file = config.log.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let db = Database::connect_with_config(
        &config.database_url,
        PoolConfig::new().max_connections(config.db_max_connections),
    )
    .await?;
    db.migrate().await?;
    info!("Database migrations applied");

    let event_bus = Arc::new(EventBus::new(defaults::EVENT_BUS_CAPACITY));
    let tm_bus = event_bus.clone();
    tokio::spawn(async move {
        telemetry_mirror(tm_bus).await;
    });

    let staging = Arc::new(StagingArea::new(config.stage_ttl, defaults::STAGE_CAPACITY));
    let sweeper = staging.clone();
    let pool = db.pool().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            log_pool_metrics(&pool);
            let purged = sweeper.purge_expired().await;
            if purged > 0 {
                tracing::debug!(subsystem = "staging", purged, "Expired staged operations purged");
            }
        }
    });

    let state = AppState::new(db.placement_service(), staging, event_bus)
        .with_rate_limiter(build_rate_limiter(&config));
    if state.rate_limiter.is_some() {
        info!(
            requests = config.rate_limit_requests,
            period_secs = config.rate_limit_period.as_secs(),
            "Rate limiting enabled"
        );
    }

    let app = build_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
