//! Health and API description endpoints.

use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::openapi::ApiDoc;

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Generated OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
