//! HTTP error mapping and the response envelope.
//!
//! Every response body has the shape
//! `{"success": bool, "message": "...", "data"?: ..., "error"?: "code"}`.
//! Expected placement rejections are returned with HTTP 200; `ApiError`
//! covers lookups that found nothing and unexpected faults.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use folio_core::MoveRejection;

/// Message returned for any fault the client cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong on our side. Please try again in a moment.";

/// Successful envelope.
pub fn success<T: Serialize>(message: impl Into<String>, data: T) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message.into(),
        "data": data,
    }))
}

/// Success envelope for operations that return no payload.
pub fn acknowledged(message: impl Into<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message.into(),
    }))
}

/// Failure envelope for a tagged rejection.
pub fn rejected(rejection: &MoveRejection) -> Json<Value> {
    let mut body = json!({
        "success": false,
        "message": rejection.message(),
        "error": rejection.code(),
        "retryable": rejection.is_retryable(),
    });
    if let Some(token) = rejection.token {
        body["token"] = json!(token);
    }
    Json(body)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Internal(folio_core::Error),

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("rate limit exceeded")]
    RateLimited,
}

impl From<folio_core::Error> for ApiError {
    fn from(err: folio_core::Error) -> Self {
        match err {
            folio_core::Error::NotFound(msg) => ApiError::NotFound {
                code: "not_found",
                message: msg,
            },
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!(subsystem = "api", error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    GENERIC_FAILURE_MESSAGE.to_string(),
                )
            }
            ApiError::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please wait before retrying.".to_string(),
            ),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Action, DocumentId};

    #[test]
    fn test_rejected_envelope() {
        let r = MoveRejection::document_not_found(Action::Move, DocumentId::new(9999).unwrap());
        let Json(body) = rejected(&r);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "document_not_found");
        assert_eq!(body["retryable"], false);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = ApiError::from(folio_core::Error::Internal("pool exhausted".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_core_not_found_maps_to_404() {
        let err = ApiError::from(folio_core::Error::NotFound("folder 4".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_acknowledged_has_no_data() {
        let Json(body) = acknowledged("Done.");
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Done.");
        assert!(body.get("data").is_none());
    }
}
