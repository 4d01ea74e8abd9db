//! Logging setup and the placement event mirror.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_core::{EventBus, PlacementEvent};

use crate::config::{LogConfig, LogFormat};

const DEFAULT_FILTER: &str = "folio_api=debug,folio_core=debug,folio_db=info,tower_http=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. With `LOG_FILE` set, output goes
/// to a daily-rotated file; the returned guard must live until shutdown.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = config.file {
        let path = Path::new(path);
        let file_dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("folio-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        match config.format {
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init(),
            LogFormat::Text => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(config.ansi.unwrap_or(false)),
                )
                .init(),
        }
        Some(guard)
    } else {
        match config.format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .init(),
            LogFormat::Text => {
                let mut layer = tracing_subscriber::fmt::layer();
                if let Some(ansi) = config.ansi {
                    layer = layer.with_ansi(ansi);
                }
                registry.with(layer).init();
            }
        }
        None
    }
}

/// Structured log line for every placement event.
pub async fn telemetry_mirror(event_bus: Arc<EventBus>) {
    let mut rx = event_bus.subscribe();
    loop {
        match rx.recv().await {
            Ok(envelope) => match &envelope.payload {
                PlacementEvent::DocumentCreated {
                    document_id,
                    folder_id,
                    ..
                } => {
                    tracing::info!(
                        target: "folio::events",
                        event = "document.created",
                        %document_id, ?folder_id,
                        "Document created"
                    );
                }
                PlacementEvent::DocumentMoved {
                    document_id,
                    from_folder_id,
                    to_folder_id,
                    ..
                } => {
                    tracing::info!(
                        target: "folio::events",
                        event = "document.moved",
                        %document_id, ?from_folder_id, %to_folder_id,
                        "Document moved"
                    );
                }
                PlacementEvent::DocumentUnfiled {
                    document_id,
                    from_folder_id,
                    ..
                } => {
                    tracing::info!(
                        target: "folio::events",
                        event = "document.unfiled",
                        %document_id, %from_folder_id,
                        "Document unfiled"
                    );
                }
                PlacementEvent::DocumentDeleted { document_id, .. } => {
                    tracing::info!(
                        target: "folio::events",
                        event = "document.deleted",
                        %document_id,
                        "Document deleted"
                    );
                }
            },
            Err(RecvError::Lagged(n)) => {
                tracing::warn!(missed = n, "Telemetry mirror lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
