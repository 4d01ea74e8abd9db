//! Folder listing handler.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use folio_core::{DocumentScope, ListDocumentsRequest};

use super::{path_folder_id, query_i64};
use crate::error::success;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Documents placed in an active folder, newest update first.
///
/// # Returns
/// - 200 OK with the page of documents
/// - 400 Bad Request for a malformed id or page parameter
/// - 404 Not Found if the folder is missing or inactive
pub async fn list_folder_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let folder_id = path_folder_id(&id)?;
    let folder = state
        .placement
        .get_folder(folder_id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            code: "folder_not_found",
            message: format!("Folder #{} no longer exists or was deactivated.", folder_id),
        })?;

    let req = ListDocumentsRequest::new(DocumentScope::InFolder(folder.id)).with_page(
        query_i64("limit", page.limit.as_deref())?,
        query_i64("offset", page.offset.as_deref())?,
    );
    let documents = state.placement.list_documents(req).await?;
    Ok(success(
        format!("{} document(s) in \"{}\".", documents.len(), folder.name),
        documents,
    ))
}
