//! Core data models for folio.
//!
//! These types are shared across all folio crates and represent the
//! organization hierarchy (company → department) and the placement entities
//! (folder, document) that live inside it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ids::{CompanyId, DepartmentId, DocumentId, FolderId};

// =============================================================================
// ORGANIZATION TYPES
// =============================================================================

/// Lifecycle status shared by companies and departments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrgStatus {
    Active,
    Inactive,
    Deleted,
}

impl OrgStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgStatus::Active => "active",
            OrgStatus::Inactive => "inactive",
            OrgStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for OrgStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OrgStatus::Active),
            "inactive" => Ok(OrgStatus::Inactive),
            "deleted" => Ok(OrgStatus::Deleted),
            other => Err(Error::CorruptRecord(format!(
                "unknown organization status '{}'",
                other
            ))),
        }
    }
}

/// A company: the outermost scope of every folder and document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub status: OrgStatus,
}

/// A department. Belongs to exactly one company for its whole life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Department {
    pub id: DepartmentId,
    pub company_id: CompanyId,
    pub name: String,
    pub status: OrgStatus,
}

// =============================================================================
// PLACEMENT TYPES
// =============================================================================

/// A folder inside a (company, department) pair. Never re-parented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Folder {
    pub id: FolderId,
    pub company_id: CompanyId,
    pub department_id: DepartmentId,
    pub name: String,
    pub active: bool,
}

/// Document lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Active,
    Archived,
    Deleted,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Active => "active",
            DocumentStatus::Archived => "archived",
            DocumentStatus::Deleted => "deleted",
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DocumentStatus::Deleted)
    }
}

impl FromStr for DocumentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DocumentStatus::Active),
            "archived" => Ok(DocumentStatus::Archived),
            "deleted" => Ok(DocumentStatus::Deleted),
            other => Err(Error::CorruptRecord(format!(
                "unknown document status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document.
///
/// `company_id` and `department_id` are fixed at upload time; only
/// `folder_id` changes through placement. `folder_id == None` means the
/// document is unfiled (sits at the root of its department).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Document {
    pub id: DocumentId,
    pub company_id: CompanyId,
    pub department_id: DepartmentId,
    pub folder_id: Option<FolderId>,
    pub name: String,
    pub status: DocumentStatus,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing representation of a document.
///
/// Every representation handed to a renderer carries the authoritative
/// `document_id`, so no client ever has to recover it from display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DocumentView {
    pub document_id: DocumentId,
    pub company_id: CompanyId,
    pub department_id: DepartmentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
    pub name: String,
    pub status: DocumentStatus,
    pub size_bytes: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentView {
    fn from(doc: &Document) -> Self {
        Self {
            document_id: doc.id,
            company_id: doc.company_id,
            department_id: doc.department_id,
            folder_id: doc.folder_id,
            name: doc.name.clone(),
            status: doc.status,
            size_bytes: doc.size_bytes,
            updated_at: doc.updated_at,
        }
    }
}

impl From<Document> for DocumentView {
    fn from(doc: Document) -> Self {
        DocumentView::from(&doc)
    }
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Metadata for a newly uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NewDocument {
    pub company_id: CompanyId,
    pub department_id: DepartmentId,
    /// Initial placement. Validated with the same scoping rules as a move.
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    pub name: String,
    #[serde(default)]
    pub size_bytes: i64,
}

/// Data for creating a folder.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NewFolder {
    pub company_id: CompanyId,
    pub department_id: DepartmentId,
    pub name: String,
}

/// Which documents to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentScope {
    /// Documents placed in a folder.
    InFolder(FolderId),
    /// Unfiled documents of a company/department pair.
    Unfiled {
        company_id: CompanyId,
        department_id: DepartmentId,
    },
}

/// Listing request for documents. Deleted documents are never listed.
#[derive(Debug, Clone, Copy)]
pub struct ListDocumentsRequest {
    pub scope: DocumentScope,
    pub limit: i64,
    pub offset: i64,
}

impl ListDocumentsRequest {
    pub fn new(scope: DocumentScope) -> Self {
        Self {
            scope,
            limit: crate::defaults::PAGE_LIMIT,
            offset: crate::defaults::PAGE_OFFSET,
        }
    }

    pub fn with_page(mut self, limit: Option<i64>, offset: Option<i64>) -> Self {
        if let Some(limit) = limit {
            self.limit = limit.clamp(1, crate::defaults::PAGE_LIMIT_MAX);
        }
        if let Some(offset) = offset {
            self.offset = offset.max(0);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        let now = Utc::now();
        Document {
            id: DocumentId::new(37).unwrap(),
            company_id: CompanyId::new(1).unwrap(),
            department_id: DepartmentId::new(2).unwrap(),
            folder_id: None,
            name: "Quarterly report.pdf".to_string(),
            status: DocumentStatus::Active,
            size_bytes: 2048,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_document_status_round_trip_strings() {
        for status in [
            DocumentStatus::Active,
            DocumentStatus::Archived,
            DocumentStatus::Deleted,
        ] {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_corrupt_record() {
        let err = "lost".parse::<DocumentStatus>().unwrap_err();
        assert!(matches!(err, Error::CorruptRecord(_)));
        assert!("gone".parse::<OrgStatus>().is_err());
    }

    #[test]
    fn test_document_view_carries_authoritative_id() {
        let doc = sample_document();
        let view = DocumentView::from(&doc);
        assert_eq!(view.document_id, doc.id);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["document_id"], 37);
        assert!(json.get("folder_id").is_none(), "unfiled omits folder_id");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&DocumentStatus::Archived).unwrap();
        assert_eq!(json, "\"archived\"");
    }

    #[test]
    fn test_list_request_page_clamping() {
        let folder = FolderId::new(9).unwrap();
        let req = ListDocumentsRequest::new(DocumentScope::InFolder(folder))
            .with_page(Some(0), Some(-4));
        assert_eq!(req.limit, 1);
        assert_eq!(req.offset, 0);

        let req = ListDocumentsRequest::new(DocumentScope::InFolder(folder))
            .with_page(Some(1_000_000), None);
        assert_eq!(req.limit, crate::defaults::PAGE_LIMIT_MAX);
    }
}
