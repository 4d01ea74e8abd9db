//! Placement service: the move operation and its siblings.
//!
//! Each operation reads the document (and folder), runs the validator, and
//! performs at most one version-checked write. Expected failures come back
//! as a [`MoveRejection`] inside `Ok`; only unexpected store faults on the
//! read path propagate as [`crate::Error`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{EventBus, PlacementEvent};
use crate::ids::{DocumentId, FolderId, RawId};
use crate::models::{Document, DocumentView, Folder, ListDocumentsRequest, NewDocument};
use crate::outcome::{
    Action, DeleteResult, MoveOutcome, MoveRejection, MoveResult, RejectionKind, Target,
    UNFILED_LABEL,
};
use crate::traits::{DocumentRepository, FolderRepository, OrganizationRepository, WriteOutcome};
use crate::validator;

/// Outcome of a document creation.
pub type CreateOutcome = std::result::Result<Document, MoveRejection>;

/// Outcome of a soft-delete.
pub type DeleteOutcome = std::result::Result<DeleteResult, MoveRejection>;

/// Coerce a client-supplied id or build the matching `InvalidRequest`.
pub(crate) fn coerce_id<T>(
    raw: &RawId,
    field: &str,
    action: Action,
    coerce: fn(&RawId) -> Option<T>,
) -> std::result::Result<T, MoveRejection> {
    coerce(raw).ok_or_else(|| {
        MoveRejection::invalid_request(
            action,
            format!("{} must be a positive integer, got {}", field, raw.describe()),
        )
    })
}

/// Document placement operations over the entity store.
#[derive(Clone)]
pub struct PlacementService {
    documents: Arc<dyn DocumentRepository>,
    folders: Arc<dyn FolderRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    events: Option<Arc<EventBus>>,
}

impl PlacementService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        folders: Arc<dyn FolderRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            documents,
            folders,
            organizations,
            events: None,
        }
    }

    /// Build from one value implementing every repository trait.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DocumentRepository + FolderRepository + OrganizationRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Announce successful placements on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    fn emit(&self, event: PlacementEvent) {
        if let Some(bus) = &self.events {
            bus.emit(event);
        }
    }

    // =========================================================================
    // MOVE
    // =========================================================================

    /// Move using raw client ids. Malformed ids are rejected before any
    /// store access.
    pub async fn move_document(
        &self,
        document_id: &RawId,
        folder_id: &RawId,
    ) -> Result<MoveOutcome> {
        let ids = coerce_id(document_id, "document_id", Action::Move, DocumentId::coerce)
            .and_then(|doc| {
                coerce_id(folder_id, "folder_id", Action::Move, FolderId::coerce)
                    .map(|folder| (doc, folder))
            });
        match ids {
            Ok((document_id, folder_id)) => self.move_to_folder(document_id, folder_id).await,
            Err(rejection) => Ok(Err(log_rejection(rejection))),
        }
    }

    /// Move a document into a folder.
    pub async fn move_to_folder(
        &self,
        document_id: DocumentId,
        folder_id: FolderId,
    ) -> Result<MoveOutcome> {
        let start = Instant::now();
        let (document, folder) = match self.plan_move(document_id, folder_id).await? {
            Ok(plan) => plan,
            Err(rejection) => return Ok(Err(log_rejection(rejection))),
        };

        let write = self
            .documents
            .set_document_folder(document.id, Some(folder.id), document.updated_at)
            .await;
        let target = Target::folder(&folder);
        let updated_at = match settle_write(write, Action::Move, &document, &target) {
            Ok(updated_at) => updated_at,
            Err(rejection) => return Ok(Err(rejection)),
        };

        self.emit(PlacementEvent::DocumentMoved {
            document_id: document.id,
            company_id: document.company_id,
            department_id: document.department_id,
            from_folder_id: document.folder_id,
            to_folder_id: folder.id,
        });
        info!(
            subsystem = "placement",
            op = "move",
            document_id = %document.id,
            folder_id = %folder.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document moved"
        );

        Ok(Ok(MoveResult {
            document_id: document.id,
            document_name: document.name,
            folder_id: Some(folder.id),
            folder_name: folder.name,
            timestamp: updated_at,
        }))
    }

    /// Load and validate a move without writing.
    pub(crate) async fn plan_move(
        &self,
        document_id: DocumentId,
        folder_id: FolderId,
    ) -> Result<std::result::Result<(Document, Folder), MoveRejection>> {
        let Some(document) = self.documents.get_document(document_id).await? else {
            return Ok(Err(
                MoveRejection::document_not_found(Action::Move, document_id)
                    .with_target(Target::folder_id(folder_id)),
            ));
        };
        let Some(folder) = self.folders.get_folder(folder_id).await? else {
            return Ok(Err(MoveRejection::for_document(
                RejectionKind::FolderNotFound,
                Action::Move,
                &document,
                Some(Target::folder_id(folder_id)),
            )));
        };

        if let Err(violation) = validator::validate(Some(&document), Some(&folder)) {
            return Ok(Err(MoveRejection::for_document(
                violation.kind(),
                Action::Move,
                &document,
                Some(Target::folder(&folder)),
            )));
        }
        Ok(Ok((document, folder)))
    }

    // =========================================================================
    // UNFILE
    // =========================================================================

    pub async fn unfile_document(&self, document_id: &RawId) -> Result<MoveOutcome> {
        match coerce_id(document_id, "document_id", Action::Unfile, DocumentId::coerce) {
            Ok(id) => self.unfile(id).await,
            Err(rejection) => Ok(Err(log_rejection(rejection))),
        }
    }

    /// Move a document back to the root of its department.
    pub async fn unfile(&self, document_id: DocumentId) -> Result<MoveOutcome> {
        let start = Instant::now();
        let document = match self.plan_unfile(document_id).await? {
            Ok(doc) => doc,
            Err(rejection) => return Ok(Err(log_rejection(rejection))),
        };

        let write = self
            .documents
            .set_document_folder(document.id, None, document.updated_at)
            .await;
        let updated_at = match settle_write(write, Action::Unfile, &document, &Target::Unfiled) {
            Ok(updated_at) => updated_at,
            Err(rejection) => return Ok(Err(rejection)),
        };

        if let Some(from_folder_id) = document.folder_id {
            self.emit(PlacementEvent::DocumentUnfiled {
                document_id: document.id,
                company_id: document.company_id,
                department_id: document.department_id,
                from_folder_id,
            });
        }
        info!(
            subsystem = "placement",
            op = "unfile",
            document_id = %document.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document unfiled"
        );

        Ok(Ok(MoveResult {
            document_id: document.id,
            document_name: document.name,
            folder_id: None,
            folder_name: UNFILED_LABEL.to_string(),
            timestamp: updated_at,
        }))
    }

    pub(crate) async fn plan_unfile(
        &self,
        document_id: DocumentId,
    ) -> Result<std::result::Result<Document, MoveRejection>> {
        let Some(document) = self.documents.get_document(document_id).await? else {
            return Ok(Err(MoveRejection::document_not_found(Action::Unfile, document_id)));
        };
        if let Err(violation) = validator::validate_unfile(Some(&document)) {
            return Ok(Err(MoveRejection::for_document(
                violation.kind(),
                Action::Unfile,
                &document,
                Some(Target::Unfiled),
            )));
        }
        Ok(Ok(document))
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    pub(crate) async fn plan_delete(
        &self,
        document_id: DocumentId,
    ) -> Result<std::result::Result<Document, MoveRejection>> {
        Ok(self
            .documents
            .get_document(document_id)
            .await?
            .ok_or_else(|| MoveRejection::document_not_found(Action::Delete, document_id)))
    }

    /// Soft-delete a document. Only reachable through a committed stage.
    pub(crate) async fn delete_document(&self, document_id: DocumentId) -> Result<DeleteOutcome> {
        let document = match self.plan_delete(document_id).await? {
            Ok(doc) => doc,
            Err(rejection) => return Ok(Err(log_rejection(rejection))),
        };

        let write = self
            .documents
            .soft_delete_document(document.id, document.updated_at)
            .await;
        let target = document
            .folder_id
            .map(Target::folder_id)
            .unwrap_or(Target::Unfiled);
        let updated_at = match settle_write(write, Action::Delete, &document, &target) {
            Ok(updated_at) => updated_at,
            Err(rejection) => return Ok(Err(rejection)),
        };

        self.emit(PlacementEvent::DocumentDeleted {
            document_id: document.id,
            company_id: document.company_id,
            department_id: document.department_id,
        });
        info!(
            subsystem = "placement",
            op = "delete",
            document_id = %document.id,
            "Document deleted"
        );

        Ok(Ok(DeleteResult {
            document_id: document.id,
            document_name: document.name,
            timestamp: updated_at,
        }))
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Create a document, validating its initial folder like a move.
    pub async fn create_document(&self, new: NewDocument) -> Result<CreateOutcome> {
        let name = new.name.trim();
        if name.is_empty() {
            return Ok(Err(log_rejection(MoveRejection::invalid_request(
                Action::Create,
                "name must not be empty",
            ))));
        }
        if new.size_bytes < 0 {
            return Ok(Err(log_rejection(MoveRejection::invalid_request(
                Action::Create,
                format!("size_bytes must not be negative, got {}", new.size_bytes),
            ))));
        }
        let new = NewDocument {
            name: name.to_string(),
            ..new
        };

        let department = self.organizations.get_department(new.department_id).await?;
        if !department.is_some_and(|d| d.company_id == new.company_id) {
            return Ok(Err(log_rejection(MoveRejection::invalid_request(
                Action::Create,
                format!(
                    "department {} does not belong to company {}",
                    new.department_id, new.company_id
                ),
            ))));
        }

        if let Some(folder_id) = new.folder_id {
            let folder = self.folders.get_folder(folder_id).await?;
            if let Err(violation) = validator::validate_initial_placement(&new, folder.as_ref()) {
                let target = match &folder {
                    Some(f) => Target::folder(f),
                    None => Target::folder_id(folder_id),
                };
                return Ok(Err(log_rejection(MoveRejection::for_new_document(
                    violation.kind(),
                    &new.name,
                    Some(target),
                ))));
            }
        }

        let name = new.name.clone();
        let document = match self.documents.insert_document(new).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(
                    subsystem = "placement",
                    op = "create",
                    error = %e,
                    "Document insert failed"
                );
                return Ok(Err(MoveRejection::for_new_document(
                    RejectionKind::WriteFailure,
                    &name,
                    None,
                )
                .with_detail(e.to_string())));
            }
        };

        self.emit(PlacementEvent::DocumentCreated {
            document_id: document.id,
            company_id: document.company_id,
            department_id: document.department_id,
            folder_id: document.folder_id,
        });
        info!(
            subsystem = "placement",
            op = "create",
            document_id = %document.id,
            company_id = %document.company_id,
            department_id = %document.department_id,
            "Document created"
        );
        Ok(Ok(document))
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub async fn get_document(&self, document_id: DocumentId) -> Result<Option<DocumentView>> {
        Ok(self
            .documents
            .get_document(document_id)
            .await?
            .map(DocumentView::from))
    }

    pub async fn list_documents(&self, req: ListDocumentsRequest) -> Result<Vec<DocumentView>> {
        let docs = self.documents.list_documents(req).await?;
        debug!(
            subsystem = "placement",
            op = "list",
            result_count = docs.len(),
            "Listed documents"
        );
        Ok(docs.into_iter().map(DocumentView::from).collect())
    }

    /// Active folder, or `None` if absent or inactive.
    pub async fn get_folder(&self, folder_id: FolderId) -> Result<Option<Folder>> {
        self.folders.get_folder(folder_id).await
    }

    /// Folders a document may legally be dropped into.
    pub async fn drop_targets(&self, document_id: DocumentId) -> Result<Option<Vec<Folder>>> {
        let Some(document) = self.documents.get_document(document_id).await? else {
            return Ok(None);
        };
        let folders = self
            .folders
            .list_folders(document.company_id, document.department_id)
            .await?;
        Ok(Some(
            folders
                .into_iter()
                .filter(|f| validator::is_reachable(&document, f))
                .filter(|f| document.folder_id != Some(f.id))
                .collect(),
        ))
    }
}

/// Turn a version-checked write into a timestamp or a storage rejection.
fn settle_write(
    write: Result<WriteOutcome>,
    action: Action,
    document: &Document,
    target: &Target,
) -> std::result::Result<chrono::DateTime<chrono::Utc>, MoveRejection> {
    match write {
        Ok(WriteOutcome::Applied { updated_at }) => Ok(updated_at),
        Ok(WriteOutcome::Stale) => {
            warn!(
                subsystem = "placement",
                document_id = %document.id,
                rejection = RejectionKind::Conflict.code(),
                "Document changed between read and write"
            );
            Err(MoveRejection::for_document(
                RejectionKind::Conflict,
                action,
                document,
                Some(target.clone()),
            ))
        }
        Err(e) => {
            warn!(
                subsystem = "placement",
                document_id = %document.id,
                rejection = RejectionKind::WriteFailure.code(),
                error = %e,
                "Placement write failed"
            );
            Err(MoveRejection::for_document(
                RejectionKind::WriteFailure,
                action,
                document,
                Some(target.clone()),
            )
            .with_detail(e.to_string()))
        }
    }
}

fn log_rejection(rejection: MoveRejection) -> MoveRejection {
    debug!(
        subsystem = "placement",
        rejection = rejection.code(),
        document_id = ?rejection.document_id.map(|d| d.get()),
        "Placement rejected"
    );
    rejection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, StoreCall};
    use crate::models::{DocumentScope, DocumentStatus};
    use crate::outcome::RejectionClass;
    use crate::{CompanyId, DepartmentId};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    /// Company 1 / department 2 holds folder 9 and unfiled document 37.
    /// Folder 20 sits in department 5 of the same company; folder 30 in
    /// another company.
    fn scenario() -> (MemoryStore, PlacementService) {
        let store = MemoryStore::new();
        let acme = store.seed_company(1, "Acme");
        let globex = store.seed_company(3, "Globex");
        let finance = store.seed_department(2, acme, "Finance");
        let legal = store.seed_department(5, acme, "Legal");
        let ops = store.seed_department(6, globex, "Ops");
        store.seed_folder(9, acme, finance, "Contracts");
        store.seed_folder(20, acme, legal, "Litigation");
        store.seed_folder(30, globex, ops, "Vendors");
        store.seed_document(37, acme, finance, None, "Q3 report.pdf");
        let service = PlacementService::from_store(Arc::new(store.clone()));
        (store, service)
    }

    fn doc_id(id: i64) -> DocumentId {
        DocumentId::new(id).unwrap()
    }

    fn folder_id(id: i64) -> FolderId {
        FolderId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_move_succeeds_and_preserves_scope() {
        let (store, service) = scenario();

        let result = service
            .move_to_folder(doc_id(37), folder_id(9))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.document_name, "Q3 report.pdf");
        assert_eq!(result.folder_name, "Contracts");
        assert_eq!(result.folder_id, Some(folder_id(9)));

        let doc = store.document_snapshot(doc_id(37)).unwrap();
        assert_eq!(doc.folder_id, Some(folder_id(9)));
        assert_eq!(doc.updated_at, result.timestamp);
        assert_eq!(doc.company_id.get(), 1);
        assert_eq!(doc.department_id.get(), 2);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_move_is_already_in_folder() {
        let (store, service) = scenario();
        service.move_to_folder(doc_id(37), folder_id(9)).await.unwrap().unwrap();
        let before = store.document_snapshot(doc_id(37)).unwrap();
        store.clear_calls();

        let rejection = service
            .move_to_folder(doc_id(37), folder_id(9))
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(rejection.kind, RejectionKind::AlreadyInFolder);
        assert!(rejection.is_benign());
        assert_eq!(store.document_snapshot(doc_id(37)).unwrap(), before);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_department_mismatch_leaves_document_untouched() {
        let (store, service) = scenario();
        let before = store.document_snapshot(doc_id(37)).unwrap();

        let rejection = service
            .move_to_folder(doc_id(37), folder_id(20))
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(rejection.kind, RejectionKind::DepartmentMismatch);
        assert_eq!(rejection.class(), RejectionClass::InvariantViolation);
        assert!(rejection.message().contains("\"Litigation\""));
        assert_eq!(store.document_snapshot(doc_id(37)).unwrap(), before);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_company_mismatch() {
        let (store, service) = scenario();
        let rejection = service
            .move_to_folder(doc_id(37), folder_id(30))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::CompanyMismatch);
        assert_eq!(store.document_snapshot(doc_id(37)).unwrap().folder_id, None);
    }

    #[tokio::test]
    async fn test_missing_document_skips_folder_lookup() {
        let (store, service) = scenario();
        let rejection = service
            .move_to_folder(doc_id(9999), folder_id(9))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::DocumentNotFound);
        assert_eq!(rejection.target, Some(Target::folder_id(folder_id(9))));
        assert!(rejection.message().contains("folder #9"));
        assert_eq!(store.calls(), vec![StoreCall::GetDocument(doc_id(9999))]);
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let (store, service) = scenario();
        let rejection = service
            .move_to_folder(doc_id(37), folder_id(12345))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::FolderNotFound);
        assert!(rejection.message().contains("folder #12345"));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_inactive_folder_and_deleted_document() {
        let (store, service) = scenario();
        store.set_folder_active(folder_id(9), false);
        let rejection = service
            .move_to_folder(doc_id(37), folder_id(9))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::FolderNotFound);

        store.set_document_status(doc_id(37), DocumentStatus::Deleted);
        let rejection = service
            .move_to_folder(doc_id(37), folder_id(20))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::DocumentNotFound);
    }

    #[tokio::test]
    async fn test_invalid_ids_fail_fast_without_store_calls() {
        let (store, service) = scenario();
        let cases: [(RawId, RawId); 6] = [
            (RawId::Int(0), RawId::Int(5)),
            (RawId::Int(-1), RawId::Int(5)),
            (RawId::Int(5), RawId::Int(0)),
            (RawId::from(""), RawId::Int(5)),
            (RawId::from("abc"), RawId::Int(5)),
            (RawId::Int(5), RawId::Other(serde_json::Value::Null)),
        ];
        for (doc, folder) in cases {
            let rejection = service
                .move_document(&doc, &folder)
                .await
                .unwrap()
                .unwrap_err();
            assert_eq!(rejection.kind, RejectionKind::InvalidRequest);
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_numeric_strings_are_coerced() {
        let (_store, service) = scenario();
        let result = service
            .move_document(&RawId::from("37"), &RawId::from(" 9 "))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.folder_id, Some(folder_id(9)));
    }

    #[tokio::test]
    async fn test_write_failure_is_retryable() {
        let (store, service) = scenario();
        store.fail_writes(true);
        let rejection = service
            .move_to_folder(doc_id(37), folder_id(9))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::WriteFailure);
        assert!(rejection.is_retryable());
        assert!(rejection.detail.is_some());
        assert_eq!(store.document_snapshot(doc_id(37)).unwrap().folder_id, None);

        store.fail_writes(false);
        assert!(service
            .move_to_folder(doc_id(37), folder_id(9))
            .await
            .unwrap()
            .is_ok());
    }

    /// Bumps the document version right after every read, as a concurrent
    /// writer landing between validation and write would.
    struct RacingStore(MemoryStore);

    #[async_trait]
    impl DocumentRepository for RacingStore {
        async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
            let doc = self.0.get_document(id).await?;
            self.0.touch_document(id);
            Ok(doc)
        }

        async fn set_document_folder(
            &self,
            id: DocumentId,
            folder_id: Option<FolderId>,
            expected_updated_at: DateTime<Utc>,
        ) -> Result<WriteOutcome> {
            self.0.set_document_folder(id, folder_id, expected_updated_at).await
        }

        async fn insert_document(&self, doc: NewDocument) -> Result<Document> {
            self.0.insert_document(doc).await
        }

        async fn soft_delete_document(
            &self,
            id: DocumentId,
            expected_updated_at: DateTime<Utc>,
        ) -> Result<WriteOutcome> {
            self.0.soft_delete_document(id, expected_updated_at).await
        }

        async fn list_documents(&self, req: ListDocumentsRequest) -> Result<Vec<Document>> {
            self.0.list_documents(req).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_change_is_conflict() {
        let (store, _) = scenario();
        let service = PlacementService::new(
            Arc::new(RacingStore(store.clone())),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );

        let rejection = service
            .move_to_folder(doc_id(37), folder_id(9))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::Conflict);
        assert!(rejection.is_retryable());
        assert_eq!(store.document_snapshot(doc_id(37)).unwrap().folder_id, None);
    }

    #[tokio::test]
    async fn test_unfile_and_repeat() {
        let (store, service) = scenario();
        service.move_to_folder(doc_id(37), folder_id(9)).await.unwrap().unwrap();

        let result = service.unfile(doc_id(37)).await.unwrap().unwrap();
        assert_eq!(result.folder_id, None);
        assert_eq!(result.folder_name, UNFILED_LABEL);
        assert_eq!(store.document_snapshot(doc_id(37)).unwrap().folder_id, None);

        let rejection = service.unfile(doc_id(37)).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::AlreadyInFolder);
        assert_eq!(rejection.target, Some(Target::Unfiled));
    }

    #[tokio::test]
    async fn test_unfile_missing_document() {
        let (_store, service) = scenario();
        let rejection = service.unfile(doc_id(404)).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::DocumentNotFound);
        assert_eq!(rejection.action, Action::Unfile);
    }

    #[tokio::test]
    async fn test_events_emitted_on_success_only() {
        let (_store, service) = scenario();
        let bus = Arc::new(EventBus::new(16));
        let service = service.with_events(bus.clone());
        let mut rx = bus.subscribe();

        service.move_to_folder(doc_id(37), folder_id(20)).await.unwrap().unwrap_err();
        service.move_to_folder(doc_id(37), folder_id(9)).await.unwrap().unwrap();
        service.unfile(doc_id(37)).await.unwrap().unwrap();

        assert_eq!(rx.recv().await.unwrap().event_type, "document.moved");
        assert_eq!(rx.recv().await.unwrap().event_type, "document.unfiled");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_soft_deletes() {
        let (store, service) = scenario();
        let result = service.delete_document(doc_id(37)).await.unwrap().unwrap();
        assert_eq!(result.document_name, "Q3 report.pdf");

        let raw = store.document_snapshot(doc_id(37)).unwrap();
        assert_eq!(raw.status, DocumentStatus::Deleted);
        assert!(service.get_document(doc_id(37)).await.unwrap().is_none());

        let again = service.delete_document(doc_id(37)).await.unwrap().unwrap_err();
        assert_eq!(again.kind, RejectionKind::DocumentNotFound);
    }

    fn new_doc(folder: Option<i64>, department: i64) -> NewDocument {
        NewDocument {
            company_id: CompanyId::new(1).unwrap(),
            department_id: DepartmentId::new(department).unwrap(),
            folder_id: folder.and_then(FolderId::new),
            name: "  intake.docx ".to_string(),
            size_bytes: 512,
        }
    }

    #[tokio::test]
    async fn test_create_document_validates_initial_folder() {
        let (store, service) = scenario();

        let created = service.create_document(new_doc(Some(9), 2)).await.unwrap().unwrap();
        assert_eq!(created.name, "intake.docx");
        assert_eq!(created.folder_id, Some(folder_id(9)));

        let rejection = service
            .create_document(new_doc(Some(20), 2))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::DepartmentMismatch);
        assert_eq!(rejection.action, Action::Create);

        let unfiled = service.create_document(new_doc(None, 2)).await.unwrap().unwrap();
        assert_eq!(unfiled.folder_id, None);

        let listed = service
            .list_documents(ListDocumentsRequest::new(DocumentScope::InFolder(folder_id(9))))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].document_id, created.id);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_create_document_rejects_bad_input() {
        let (_store, service) = scenario();

        let mut blank = new_doc(None, 2);
        blank.name = "   ".to_string();
        let rejection = service.create_document(blank).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::InvalidRequest);

        let mut negative = new_doc(None, 2);
        negative.size_bytes = -1;
        let rejection = service.create_document(negative).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::InvalidRequest);

        // Department 6 belongs to company 3.
        let rejection = service
            .create_document(new_doc(None, 6))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_drop_targets_exclude_current_and_foreign_folders() {
        let (store, service) = scenario();
        let acme = CompanyId::new(1).unwrap();
        let finance = DepartmentId::new(2).unwrap();
        store.seed_folder(10, acme, finance, "Archive");
        service.move_to_folder(doc_id(37), folder_id(9)).await.unwrap().unwrap();

        let targets = service.drop_targets(doc_id(37)).await.unwrap().unwrap();
        let ids: Vec<i64> = targets.iter().map(|f| f.id.get()).collect();
        assert_eq!(ids, vec![10]);
        assert!(service.drop_targets(doc_id(9999)).await.unwrap().is_none());
    }
}
