//! Typed placement requests and the stage/commit protocol.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use folio_core::{Action, MoveRejection, OperationOutcome, PlacementRequest};

use super::parse_body;
use crate::error::{acknowledged, rejected, success};
use crate::{ApiError, AppState};

fn operation_response(outcome: OperationOutcome) -> Json<Value> {
    match outcome {
        Ok(completed) => success(completed.message(), &completed),
        Err(rejection) => rejected(&rejection),
    }
}

fn parse_request(headers: &HeaderMap, body: &Bytes) -> Result<PlacementRequest, Json<Value>> {
    parse_body(headers, body)
        .map_err(|detail| rejected(&MoveRejection::invalid_request(Action::Move, detail)))
}

fn parse_token(raw: &str) -> Result<Uuid, Json<Value>> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        rejected(&MoveRejection::invalid_request(
            Action::Delete,
            format!("token must be a UUID, got '{}'", raw),
        ))
    })
}

/// Run a request directly. Destructive requests answer
/// `confirmation_required`.
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request = match parse_request(&headers, &body) {
        Ok(request) => request,
        Err(response) => return Ok(response),
    };
    Ok(operation_response(state.operations.dispatch(&request).await?))
}

/// Validate a request and hold it for confirmation.
pub async fn stage(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request = match parse_request(&headers, &body) {
        Ok(request) => request,
        Err(response) => return Ok(response),
    };
    Ok(match state.operations.stage(request).await? {
        Ok(staged) => success(staged.preview.clone(), &staged),
        Err(rejection) => rejected(&rejection),
    })
}

/// Execute a staged operation.
pub async fn commit(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let token = match parse_token(&token) {
        Ok(token) => token,
        Err(response) => return Ok(response),
    };
    Ok(operation_response(state.operations.commit(token).await?))
}

/// Cancel a staged operation.
pub async fn discard(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Json<Value> {
    let token = match parse_token(&token) {
        Ok(token) => token,
        Err(response) => return response,
    };
    if state.operations.discard(token).await {
        acknowledged("The pending operation was cancelled.")
    } else {
        rejected(&MoveRejection::stage_not_found(token))
    }
}
