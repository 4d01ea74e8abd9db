//! # folio-api
//!
//! HTTP surface for folio: document placement (move, unfile, create),
//! placement listings, and the stage/commit protocol for destructive
//! operations. Every response uses the `{success, message, data | error}`
//! envelope from [`error`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod telemetry;

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use folio_core::{defaults, EventBus, Operations, PlacementService, StagingArea};

pub use config::ApiConfig;
pub use error::ApiError;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub placement: PlacementService,
    pub operations: Operations,
    /// Placement notifications (telemetry mirror, future push channels).
    pub event_bus: Arc<EventBus>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    /// Wire the placement service to `event_bus` and build the operation
    /// layer over `staging`.
    pub fn new(
        placement: PlacementService,
        staging: Arc<StagingArea>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let placement = placement.with_events(event_bus.clone());
        Self {
            operations: Operations::new(placement.clone(), staging),
            placement,
            event_bus,
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }
}

/// Build the global limiter, or `None` when disabled.
pub fn build_rate_limiter(config: &ApiConfig) -> Option<Arc<GlobalRateLimiter>> {
    if !config.rate_limit_enabled {
        return None;
    }
    let burst = NonZeroU32::new(config.rate_limit_requests)?;
    let quota = Quota::with_period(config.rate_limit_period)?.allow_burst(burst);
    Some(Arc::new(RateLimiter::direct(quota)))
}

fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Assemble every route and the middleware stack.
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    use crate::handlers::{documents, folders, health, operations};

    Router::new()
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(health::openapi_json))
        // Placement
        .route("/api/v1/documents", post(documents::create_document))
        .route("/api/v1/documents/move", post(documents::move_document))
        .route("/api/v1/documents/unfiled", get(documents::list_unfiled))
        .route("/api/v1/documents/:id", get(documents::get_document))
        .route("/api/v1/documents/:id/unfile", post(documents::unfile_document))
        .route("/api/v1/documents/:id/targets", get(documents::drop_targets))
        .route(
            "/api/v1/folders/:id/documents",
            get(folders::list_folder_documents),
        )
        // Typed requests and the two-step protocol
        .route("/api/v1/operations", post(operations::dispatch))
        .route("/api/v1/operations/stage", post(operations::stage))
        .route("/api/v1/operations/:token", delete(operations::discard))
        .route("/api/v1/operations/:token/commit", post(operations::commit))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parse_allowed_origins(
                    &config.allowed_origins,
                )))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(defaults::REQUEST_BODY_LIMIT_BYTES))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<Response, ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = "api", "Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rate_limiter_disabled() {
        let config = ApiConfig {
            rate_limit_enabled: false,
            ..ApiConfig::default()
        };
        assert!(build_rate_limiter(&config).is_none());
    }

    #[test]
    fn test_rate_limiter_burst() {
        let config = ApiConfig {
            rate_limit_requests: 2,
            rate_limit_period: Duration::from_secs(3600),
            ..ApiConfig::default()
        };
        let limiter = build_rate_limiter(&config).unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_invalid_origins_are_skipped() {
        let origins = vec!["https://ok.example".to_string(), "bad\norigin".to_string()];
        assert_eq!(parse_allowed_origins(&origins).len(), 1);
    }
}
