//! HTTP handlers for folio-api.

pub mod documents;
pub mod folders;
pub mod health;
pub mod operations;

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde::de::DeserializeOwned;

use folio_core::{DocumentId, FolderId, RawId};

use crate::error::ApiError;

/// Decode a request body as form data or JSON, based on `Content-Type`.
///
/// Anything that is not `application/x-www-form-urlencoded` is read as JSON.
pub(crate) fn parse_body<T: DeserializeOwned>(headers: &HeaderMap, body: &Bytes) -> Result<T, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err("request body is empty".to_string());
    }
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        serde_urlencoded::from_bytes(body).map_err(|e| format!("malformed form body: {}", e))
    } else {
        serde_json::from_slice(body).map_err(|e| format!("malformed JSON body: {}", e))
    }
}

/// Path segment to document id, or 400.
pub(crate) fn path_document_id(raw: &str) -> Result<DocumentId, ApiError> {
    DocumentId::coerce(&RawId::from(raw)).ok_or_else(|| {
        ApiError::BadRequest(format!("document id must be a positive integer, got '{}'", raw))
    })
}

pub(crate) fn path_folder_id(raw: &str) -> Result<FolderId, ApiError> {
    FolderId::coerce(&RawId::from(raw)).ok_or_else(|| {
        ApiError::BadRequest(format!("folder id must be a positive integer, got '{}'", raw))
    })
}

/// Optional numeric query parameter, or 400.
pub(crate) fn query_i64(name: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{} must be an integer, got '{}'", name, s))),
    }
}
