//! Document placement handlers.
//!
//! Move and unfile report expected failures as a rejection envelope with
//! HTTP 200 so the caller can render the message and re-sync; only faults
//! and read-side lookups use non-200 statuses.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use folio_core::{
    Action, CompanyId, DepartmentId, DocumentScope, DocumentView, FolderId, ListDocumentsRequest,
    MoveOutcome, MoveRejection, NewDocument, RawId,
};

use super::{parse_body, path_document_id, query_i64};
use crate::error::{rejected, success};
use crate::{ApiError, AppState};

/// Body of a move request. Accepted as JSON or form data.
#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub document_id: Option<RawId>,
    pub folder_id: Option<RawId>,
}

/// Body of a document creation request.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentBody {
    pub company_id: Option<RawId>,
    pub department_id: Option<RawId>,
    pub folder_id: Option<RawId>,
    pub name: Option<String>,
    pub size_bytes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UnfiledQuery {
    pub company_id: Option<String>,
    pub department_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn move_response(outcome: MoveOutcome) -> Json<Value> {
    match outcome {
        Ok(result) => success(result.message(), &result),
        Err(rejection) => rejected(&rejection),
    }
}

fn invalid(action: Action, detail: impl Into<String>) -> Json<Value> {
    rejected(&MoveRejection::invalid_request(action, detail))
}

/// Move a document into a folder.
///
/// `document_id` and `folder_id` may be numbers or numeric strings.
pub async fn move_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: MoveBody = match parse_body(&headers, &body) {
        Ok(body) => body,
        Err(detail) => return Ok(invalid(Action::Move, detail)),
    };
    let (Some(document_id), Some(folder_id)) = (body.document_id, body.folder_id) else {
        return Ok(invalid(Action::Move, "document_id and folder_id are required"));
    };

    let outcome = state
        .placement
        .move_document(&document_id, &folder_id)
        .await?;
    Ok(move_response(outcome))
}

/// Move a document out of its folder.
pub async fn unfile_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.placement.unfile_document(&RawId::Text(id)).await?;
    Ok(move_response(outcome))
}

/// Create a document, optionally placed in a folder of its department.
pub async fn create_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: CreateDocumentBody = match parse_body(&headers, &body) {
        Ok(body) => body,
        Err(detail) => return Ok(invalid(Action::Create, detail)),
    };

    let Some(company_id) = body.company_id.as_ref().and_then(CompanyId::coerce) else {
        return Ok(invalid(Action::Create, "company_id must be a positive integer"));
    };
    let Some(department_id) = body.department_id.as_ref().and_then(DepartmentId::coerce) else {
        return Ok(invalid(Action::Create, "department_id must be a positive integer"));
    };
    let folder_id = match body.folder_id {
        None => None,
        Some(raw) => match FolderId::coerce(&raw) {
            Some(id) => Some(id),
            None => {
                return Ok(invalid(
                    Action::Create,
                    format!("folder_id must be a positive integer, got {}", raw.describe()),
                ))
            }
        },
    };

    let new = NewDocument {
        company_id,
        department_id,
        folder_id,
        name: body.name.unwrap_or_default(),
        size_bytes: body.size_bytes.unwrap_or(0),
    };

    Ok(match state.placement.create_document(new).await? {
        Ok(document) => success(
            format!("\"{}\" was created.", document.name),
            DocumentView::from(&document),
        ),
        Err(rejection) => rejected(&rejection),
    })
}

/// Fetch one document with its authoritative id.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let document_id = path_document_id(&id)?;
    let view = state
        .placement
        .get_document(document_id)
        .await?
        .ok_or_else(|| document_not_found(document_id))?;
    Ok(success(format!("Document \"{}\".", view.name), view))
}

/// Folders the document may legally be dropped into.
pub async fn drop_targets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let document_id = path_document_id(&id)?;
    let folders = state
        .placement
        .drop_targets(document_id)
        .await?
        .ok_or_else(|| document_not_found(document_id))?;
    Ok(success(
        format!("{} folder(s) available.", folders.len()),
        folders,
    ))
}

/// Unfiled documents of a company/department pair.
pub async fn list_unfiled(
    State(state): State<AppState>,
    Query(query): Query<UnfiledQuery>,
) -> Result<Json<Value>, ApiError> {
    let company_id = query
        .company_id
        .as_deref()
        .and_then(|raw| CompanyId::coerce(&RawId::from(raw)))
        .ok_or_else(|| ApiError::BadRequest("company_id must be a positive integer".into()))?;
    let department_id = query
        .department_id
        .as_deref()
        .and_then(|raw| DepartmentId::coerce(&RawId::from(raw)))
        .ok_or_else(|| ApiError::BadRequest("department_id must be a positive integer".into()))?;

    let req = ListDocumentsRequest::new(DocumentScope::Unfiled {
        company_id,
        department_id,
    })
    .with_page(
        query_i64("limit", query.limit.as_deref())?,
        query_i64("offset", query.offset.as_deref())?,
    );
    let documents: Vec<DocumentView> = state.placement.list_documents(req).await?;
    Ok(success(
        format!("{} unfiled document(s).", documents.len()),
        documents,
    ))
}

fn document_not_found(document_id: folio_core::DocumentId) -> ApiError {
    ApiError::NotFound {
        code: "document_not_found",
        message: format!("Document #{} no longer exists or was deleted.", document_id),
    }
}
