//! Repository traits: the entity store contract consumed by the placement core.
//!
//! Concrete backends (PostgreSQL in `folio-db`, the in-memory store behind
//! the `memory` feature) implement these so the placement logic can be
//! tested without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::ids::{CompanyId, DepartmentId, DocumentId, FolderId};
use crate::models::*;

/// Result of a version-checked single-row write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The row was updated and stamped with `updated_at`.
    Applied { updated_at: DateTime<Utc> },
    /// The row no longer matched the expected version (or vanished).
    Stale,
}

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Fetch a non-deleted document. Deleted documents read as `None`.
    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>>;

    /// Atomically reassign a document's folder (`None` = unfiled).
    ///
    /// Applies only if the document is non-deleted, still carries
    /// `expected_updated_at`, and (for `Some(folder)`) the folder is still
    /// active. Stamps a fresh `updated_at` on success.
    async fn set_document_folder(
        &self,
        id: DocumentId,
        folder_id: Option<FolderId>,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<WriteOutcome>;

    /// Insert a new active document. Scoping is validated by the caller.
    async fn insert_document(&self, doc: NewDocument) -> Result<Document>;

    /// Mark a document deleted, with the same version check as
    /// [`DocumentRepository::set_document_folder`].
    async fn soft_delete_document(
        &self,
        id: DocumentId,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<WriteOutcome>;

    /// List non-deleted documents, newest update first.
    async fn list_documents(&self, req: ListDocumentsRequest) -> Result<Vec<Document>>;
}

// =============================================================================
// FOLDER REPOSITORY
// =============================================================================

#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Fetch an active folder. Inactive folders read as `None`.
    async fn get_folder(&self, id: FolderId) -> Result<Option<Folder>>;

    /// Create an active folder. The department must belong to the company.
    async fn create_folder(&self, folder: NewFolder) -> Result<Folder>;

    /// List active folders of a company/department pair, ordered by name.
    async fn list_folders(
        &self,
        company_id: CompanyId,
        department_id: DepartmentId,
    ) -> Result<Vec<Folder>>;

    /// Deactivate a folder. Documents inside keep their placement.
    async fn deactivate_folder(&self, id: FolderId) -> Result<()>;
}

// =============================================================================
// ORGANIZATION REPOSITORY
// =============================================================================

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn create_company(&self, name: &str) -> Result<Company>;

    async fn get_company(&self, id: CompanyId) -> Result<Option<Company>>;

    /// Create a department under a company. The owner never changes.
    async fn create_department(&self, company_id: CompanyId, name: &str) -> Result<Department>;

    async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>>;

    async fn list_departments(&self, company_id: CompanyId) -> Result<Vec<Department>>;
}
