//! OpenAPI description (utoipa metadata).
//!
//! Schemas only; the response envelope wraps each of them in `data`.

use utoipa::OpenApi;

use folio_core::{
    Company, DeleteResult, Department, Document, DocumentStatus, DocumentView, Folder, MoveResult,
    NewDocument, NewFolder, OrgStatus,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API",
        description = "Document placement across companies, departments and folders"
    ),
    components(schemas(
        Company,
        Department,
        OrgStatus,
        Folder,
        Document,
        DocumentStatus,
        DocumentView,
        NewDocument,
        NewFolder,
        MoveResult,
        DeleteResult
    )),
    tags(
        (name = "Documents", description = "Move, unfile and create documents"),
        (name = "Operations", description = "Typed requests and stage/commit confirmation"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_registered() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in ["DocumentView", "MoveResult", "Folder"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
