//! Typed placement requests and the two-step protocol for destructive ones.
//!
//! A [`PlacementRequest`] names one operation. Non-destructive requests run
//! directly through [`Operations::dispatch`]; destructive requests must be
//! staged first, previewed, and then committed with the returned token.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::ids::{DocumentId, FolderId, RawId};
use crate::outcome::{Action, DeleteResult, MoveRejection, MoveResult, RejectionKind};
use crate::placement::{coerce_id, PlacementService};

// =============================================================================
// REQUESTS
// =============================================================================

/// A placement request as a client sends it.
///
/// `{"kind":"move","document_id":37,"folder_id":"9"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementRequest {
    Move { document_id: RawId, folder_id: RawId },
    Unfile { document_id: RawId },
    Delete { document_id: RawId },
}

impl PlacementRequest {
    /// Whether the request needs stage/commit confirmation.
    pub fn is_destructive(&self) -> bool {
        matches!(self, PlacementRequest::Delete { .. })
    }

    pub fn action(&self) -> Action {
        match self {
            PlacementRequest::Move { .. } => Action::Move,
            PlacementRequest::Unfile { .. } => Action::Unfile,
            PlacementRequest::Delete { .. } => Action::Delete,
        }
    }

    fn resolve(&self) -> std::result::Result<Resolved, MoveRejection> {
        let action = self.action();
        match self {
            PlacementRequest::Move {
                document_id,
                folder_id,
            } => {
                let document_id = coerce_id(document_id, "document_id", action, DocumentId::coerce)?;
                let folder_id = coerce_id(folder_id, "folder_id", action, FolderId::coerce)?;
                Ok(Resolved::Move(document_id, folder_id))
            }
            PlacementRequest::Unfile { document_id } => Ok(Resolved::Unfile(coerce_id(
                document_id,
                "document_id",
                action,
                DocumentId::coerce,
            )?)),
            PlacementRequest::Delete { document_id } => Ok(Resolved::Delete(coerce_id(
                document_id,
                "document_id",
                action,
                DocumentId::coerce,
            )?)),
        }
    }
}

/// A request with coerced identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Move(DocumentId, FolderId),
    Unfile(DocumentId),
    Delete(DocumentId),
}

/// A completed operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Completed {
    Moved(MoveResult),
    Deleted(DeleteResult),
}

impl Completed {
    pub fn message(&self) -> String {
        match self {
            Completed::Moved(result) => result.message(),
            Completed::Deleted(result) => result.message(),
        }
    }
}

pub type OperationOutcome = std::result::Result<Completed, MoveRejection>;

// =============================================================================
// STAGING
// =============================================================================

/// A validated request waiting for confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct StagedOperation {
    pub token: Uuid,
    pub request: PlacementRequest,
    /// User-facing sentence describing what commit will do.
    pub preview: String,
    pub staged_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    resolved: Resolved,
}

struct StagedEntry {
    operation: StagedOperation,
    deadline: Instant,
}

/// In-memory store of staged operations with a time-to-live.
pub struct StagingArea {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<Uuid, StagedEntry>>,
}

impl StagingArea {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn insert(
        &self,
        request: PlacementRequest,
        resolved: Resolved,
        preview: String,
    ) -> StagedOperation {
        let now = Utc::now();
        let operation = StagedOperation {
            token: Uuid::now_v7(),
            request,
            preview,
            staged_at: now,
            expires_at: now
                + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero()),
            resolved,
        };

        let mut entries = self.entries.lock().await;
        let clock = Instant::now();
        entries.retain(|_, e| e.deadline > clock);
        if entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.deadline)
                .map(|(token, _)| *token);
            if let Some(token) = oldest {
                warn!(
                    subsystem = "staging",
                    stage_token = %token,
                    capacity = self.capacity,
                    "Staging area full, evicting oldest entry"
                );
                entries.remove(&token);
            }
        }
        entries.insert(
            operation.token,
            StagedEntry {
                operation: operation.clone(),
                deadline: clock + self.ttl,
            },
        );
        operation
    }

    /// Remove and return a live entry. Expired entries are dropped.
    pub async fn take(&self, token: Uuid) -> Option<StagedOperation> {
        let entry = self.entries.lock().await.remove(&token)?;
        if entry.deadline <= Instant::now() {
            debug!(subsystem = "staging", stage_token = %token, "Staged operation expired");
            return None;
        }
        Some(entry.operation)
    }

    /// Cancel a staged operation. Returns whether it existed.
    pub async fn discard(&self, token: Uuid) -> bool {
        self.entries.lock().await.remove(&token).is_some()
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, e| e.deadline > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for StagingArea {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(crate::defaults::STAGE_TTL_SECS),
            crate::defaults::STAGE_CAPACITY,
        )
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Entry point for typed requests.
#[derive(Clone)]
pub struct Operations {
    service: PlacementService,
    staging: Arc<StagingArea>,
}

impl Operations {
    pub fn new(service: PlacementService, staging: Arc<StagingArea>) -> Self {
        Self { service, staging }
    }

    pub fn service(&self) -> &PlacementService {
        &self.service
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Run a request directly. Destructive requests are refused with
    /// `ConfirmationRequired` and nothing is written.
    pub async fn dispatch(&self, request: &PlacementRequest) -> Result<OperationOutcome> {
        let resolved = match request.resolve() {
            Ok(resolved) => resolved,
            Err(rejection) => return Ok(Err(rejection)),
        };
        if let Resolved::Delete(document_id) = resolved {
            let rejection = match self.service.plan_delete(document_id).await? {
                Ok(document) => MoveRejection::for_document(
                    RejectionKind::ConfirmationRequired,
                    Action::Delete,
                    &document,
                    None,
                ),
                Err(rejection) => rejection,
            };
            debug!(
                subsystem = "staging",
                op = "dispatch",
                rejection = rejection.code(),
                "Destructive request refused without confirmation"
            );
            return Ok(Err(rejection));
        }
        self.execute(resolved).await
    }

    /// Validate a request against current state and hold it for commit.
    pub async fn stage(
        &self,
        request: PlacementRequest,
    ) -> Result<std::result::Result<StagedOperation, MoveRejection>> {
        let resolved = match request.resolve() {
            Ok(resolved) => resolved,
            Err(rejection) => return Ok(Err(rejection)),
        };
        let preview = match resolved {
            Resolved::Move(document_id, folder_id) => {
                match self.service.plan_move(document_id, folder_id).await? {
                    Ok((document, folder)) => format!(
                        "Move \"{}\" to folder \"{}\".",
                        document.name, folder.name
                    ),
                    Err(rejection) => return Ok(Err(rejection)),
                }
            }
            Resolved::Unfile(document_id) => match self.service.plan_unfile(document_id).await? {
                Ok(document) => format!("Move \"{}\" out of its folder.", document.name),
                Err(rejection) => return Ok(Err(rejection)),
            },
            Resolved::Delete(document_id) => match self.service.plan_delete(document_id).await? {
                Ok(document) => format!(
                    "Delete \"{}\". It will no longer appear in any listing.",
                    document.name
                ),
                Err(rejection) => return Ok(Err(rejection)),
            },
        };

        let operation = self.staging.insert(request, resolved, preview).await;
        info!(
            subsystem = "staging",
            op = "stage",
            stage_token = %operation.token,
            action = ?operation.request.action(),
            "Operation staged"
        );
        Ok(Ok(operation))
    }

    /// Execute a staged operation. State is re-validated at commit time.
    pub async fn commit(&self, token: Uuid) -> Result<OperationOutcome> {
        let Some(operation) = self.staging.take(token).await else {
            return Ok(Err(MoveRejection::stage_not_found(token)));
        };
        info!(
            subsystem = "staging",
            op = "commit",
            stage_token = %token,
            "Committing staged operation"
        );
        let outcome = self.execute(operation.resolved).await?;
        Ok(outcome.map_err(|rejection| rejection.with_token(token)))
    }

    /// Cancel a staged operation without touching the store.
    pub async fn discard(&self, token: Uuid) -> bool {
        let existed = self.staging.discard(token).await;
        debug!(subsystem = "staging", op = "discard", stage_token = %token, existed, "Discard");
        existed
    }

    async fn execute(&self, resolved: Resolved) -> Result<OperationOutcome> {
        Ok(match resolved {
            Resolved::Move(document_id, folder_id) => self
                .service
                .move_to_folder(document_id, folder_id)
                .await?
                .map(Completed::Moved),
            Resolved::Unfile(document_id) => {
                self.service.unfile(document_id).await?.map(Completed::Moved)
            }
            Resolved::Delete(document_id) => self
                .service
                .delete_document(document_id)
                .await?
                .map(Completed::Deleted),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::DocumentStatus;

    fn setup() -> (MemoryStore, Operations) {
        let store = MemoryStore::new();
        let acme = store.seed_company(1, "Acme");
        let finance = store.seed_department(2, acme, "Finance");
        store.seed_folder(9, acme, finance, "Contracts");
        store.seed_document(37, acme, finance, None, "Q3 report.pdf");
        let service = PlacementService::from_store(Arc::new(store.clone()));
        let ops = Operations::new(service, Arc::new(StagingArea::default()));
        (store, ops)
    }

    fn delete_37() -> PlacementRequest {
        PlacementRequest::Delete {
            document_id: RawId::Int(37),
        }
    }

    fn doc37() -> DocumentId {
        DocumentId::new(37).unwrap()
    }

    #[test]
    fn test_request_serde_shape() {
        let req: PlacementRequest =
            serde_json::from_str(r#"{"kind":"move","document_id":37,"folder_id":"9"}"#).unwrap();
        assert_eq!(
            req,
            PlacementRequest::Move {
                document_id: RawId::Int(37),
                folder_id: RawId::Text("9".to_string()),
            }
        );
        assert!(!req.is_destructive());
        assert!(delete_37().is_destructive());

        assert!(serde_json::from_str::<PlacementRequest>(r#"{"kind":"rename"}"#).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_move() {
        let (store, ops) = setup();
        let req = PlacementRequest::Move {
            document_id: RawId::Int(37),
            folder_id: RawId::Int(9),
        };
        let done = ops.dispatch(&req).await.unwrap().unwrap();
        assert!(matches!(done, Completed::Moved(_)));
        assert_eq!(
            store.document_snapshot(doc37()).unwrap().folder_id.map(|f| f.get()),
            Some(9)
        );
    }

    #[tokio::test]
    async fn test_dispatch_invalid_ids() {
        let (store, ops) = setup();
        let req = PlacementRequest::Unfile {
            document_id: RawId::from("zero"),
        };
        let rejection = ops.dispatch(&req).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::InvalidRequest);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_delete_requires_confirmation() {
        let (store, ops) = setup();
        let rejection = ops.dispatch(&delete_37()).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::ConfirmationRequired);
        assert!(rejection.message().contains("\"Q3 report.pdf\""));
        assert_eq!(store.write_count(), 0);
        assert_eq!(
            store.document_snapshot(doc37()).unwrap().status,
            DocumentStatus::Active
        );
    }

    #[tokio::test]
    async fn test_stage_then_commit_delete() {
        let (store, ops) = setup();
        let staged = ops.stage(delete_37()).await.unwrap().unwrap();
        assert!(staged.preview.contains("Q3 report.pdf"));
        assert_eq!(store.write_count(), 0);

        let done = ops.commit(staged.token).await.unwrap().unwrap();
        assert!(matches!(done, Completed::Deleted(_)));
        assert_eq!(
            store.document_snapshot(doc37()).unwrap().status,
            DocumentStatus::Deleted
        );

        // Tokens are single-use.
        let again = ops.commit(staged.token).await.unwrap().unwrap_err();
        assert_eq!(again.kind, RejectionKind::StageNotFound);
        assert_eq!(again.token, Some(staged.token));
    }

    #[tokio::test]
    async fn test_stage_rejects_like_direct_call() {
        let (_store, ops) = setup();
        let rejection = ops
            .stage(PlacementRequest::Delete {
                document_id: RawId::Int(9999),
            })
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::DocumentNotFound);
        assert!(ops.staging().is_empty().await);
    }

    #[tokio::test]
    async fn test_discard_is_reversible_and_storeless() {
        let (store, ops) = setup();
        let staged = ops.stage(delete_37()).await.unwrap().unwrap();
        store.clear_calls();

        assert!(ops.discard(staged.token).await);
        assert!(!ops.discard(staged.token).await);
        assert!(store.calls().is_empty());

        let rejection = ops.commit(staged.token).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::StageNotFound);
        assert_eq!(
            store.document_snapshot(doc37()).unwrap().status,
            DocumentStatus::Active
        );
    }

    #[tokio::test]
    async fn test_commit_revalidates() {
        let (store, ops) = setup();
        let staged = ops
            .stage(PlacementRequest::Move {
                document_id: RawId::Int(37),
                folder_id: RawId::Int(9),
            })
            .await
            .unwrap()
            .unwrap();
        store.set_folder_active(FolderId::new(9).unwrap(), false);

        let rejection = ops.commit(staged.token).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::FolderNotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_stage_not_found() {
        let (store, ops) = setup();
        let staged = ops.stage(delete_37()).await.unwrap().unwrap();

        tokio::time::advance(ops.staging().ttl() + Duration::from_secs(1)).await;

        let rejection = ops.commit(staged.token).await.unwrap().unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::StageNotFound);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_and_capacity() {
        let staging = StagingArea::new(Duration::from_secs(10), 2);
        for _ in 0..3 {
            staging
                .insert(delete_37(), Resolved::Delete(doc37()), "Delete.".to_string())
                .await;
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        assert_eq!(staging.len().await, 2);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(staging.purge_expired().await, 2);
        assert!(staging.is_empty().await);
    }
}
