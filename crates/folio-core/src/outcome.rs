//! Placement result descriptors and the tagged rejection taxonomy.
//!
//! Every expected way a placement can fail is a [`MoveRejection`] value, not
//! an [`crate::Error`]. A rejection carries enough context (ids and names) to
//! render one human-readable sentence without another lookup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::ids::{DocumentId, FolderId};
use crate::models::{Document, Folder};

/// Display name used for the root ("no folder") placement.
pub const UNFILED_LABEL: &str = "Unfiled";

/// Which placement operation produced a result or rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Move,
    Unfile,
    Delete,
}

impl Action {
    fn past_participle(&self) -> &'static str {
        match self {
            Action::Create => "created",
            Action::Move | Action::Unfile => "moved",
            Action::Delete => "deleted",
        }
    }
}

/// Successful move or unfile.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct MoveResult {
    pub document_id: DocumentId,
    pub document_name: String,
    /// `None` when the document was unfiled.
    pub folder_id: Option<FolderId>,
    pub folder_name: String,
    /// Completion timestamp; equals the document's new `updated_at`.
    pub timestamp: DateTime<Utc>,
}

impl MoveResult {
    pub fn message(&self) -> String {
        match self.folder_id {
            Some(_) => format!(
                "\"{}\" was moved to folder \"{}\".",
                self.document_name, self.folder_name
            ),
            None => format!("\"{}\" was moved out of its folder.", self.document_name),
        }
    }
}

/// Successful soft-delete.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct DeleteResult {
    pub document_id: DocumentId,
    pub document_name: String,
    pub timestamp: DateTime<Utc>,
}

impl DeleteResult {
    pub fn message(&self) -> String {
        format!("\"{}\" was deleted.", self.document_name)
    }
}

/// Outcome of a move or unfile: a result descriptor or a tagged rejection.
pub type MoveOutcome = std::result::Result<MoveResult, MoveRejection>;

// =============================================================================
// REJECTIONS
// =============================================================================

/// Broad class of a rejection, deciding how a caller should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionClass {
    /// Caller's fault; fix the request, do not retry as-is.
    Input,
    /// Stale identifier; not retryable.
    NotFound,
    /// Structural scoping violation; never succeeds without a new target.
    InvariantViolation,
    /// Nothing to do; a tolerant caller may treat it as success.
    BenignNoOp,
    /// Transient storage fault or lost race; retryable.
    StorageFault,
    /// Two-step protocol misuse (missing confirmation, expired token).
    Protocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    InvalidRequest,
    DocumentNotFound,
    FolderNotFound,
    CompanyMismatch,
    DepartmentMismatch,
    AlreadyInFolder,
    WriteFailure,
    Conflict,
    ConfirmationRequired,
    StageNotFound,
}

impl RejectionKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionKind::InvalidRequest => "invalid_request",
            RejectionKind::DocumentNotFound => "document_not_found",
            RejectionKind::FolderNotFound => "folder_not_found",
            RejectionKind::CompanyMismatch => "company_mismatch",
            RejectionKind::DepartmentMismatch => "department_mismatch",
            RejectionKind::AlreadyInFolder => "already_in_folder",
            RejectionKind::WriteFailure => "write_failure",
            RejectionKind::Conflict => "conflict",
            RejectionKind::ConfirmationRequired => "confirmation_required",
            RejectionKind::StageNotFound => "stage_not_found",
        }
    }

    pub fn class(&self) -> RejectionClass {
        match self {
            RejectionKind::InvalidRequest => RejectionClass::Input,
            RejectionKind::DocumentNotFound | RejectionKind::FolderNotFound => {
                RejectionClass::NotFound
            }
            RejectionKind::CompanyMismatch | RejectionKind::DepartmentMismatch => {
                RejectionClass::InvariantViolation
            }
            RejectionKind::AlreadyInFolder => RejectionClass::BenignNoOp,
            RejectionKind::WriteFailure | RejectionKind::Conflict => RejectionClass::StorageFault,
            RejectionKind::ConfirmationRequired | RejectionKind::StageNotFound => {
                RejectionClass::Protocol
            }
        }
    }
}

/// Where a document was (or would have been) placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Folder {
        folder_id: FolderId,
        #[serde(skip_serializing_if = "Option::is_none")]
        folder_name: Option<String>,
    },
    Unfiled,
}

impl Target {
    pub fn folder(folder: &Folder) -> Self {
        Target::Folder {
            folder_id: folder.id,
            folder_name: Some(folder.name.clone()),
        }
    }

    pub fn folder_id(id: FolderId) -> Self {
        Target::Folder {
            folder_id: id,
            folder_name: None,
        }
    }

    fn label(&self) -> String {
        match self {
            Target::Folder {
                folder_name: Some(name),
                ..
            } => format!("folder \"{}\"", name),
            Target::Folder { folder_id, .. } => format!("folder #{}", folder_id),
            Target::Unfiled => UNFILED_LABEL.to_string(),
        }
    }
}

/// A placement that was refused, with the context needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveRejection {
    pub kind: RejectionKind,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    /// Extra explanation (offending input, storage error text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Staging token, for protocol rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Uuid>,
}

impl MoveRejection {
    fn bare(kind: RejectionKind, action: Action) -> Self {
        Self {
            kind,
            action,
            document_id: None,
            document_name: None,
            target: None,
            detail: None,
            token: None,
        }
    }

    pub fn invalid_request(action: Action, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::bare(RejectionKind::InvalidRequest, action)
        }
    }

    pub fn document_not_found(action: Action, document_id: DocumentId) -> Self {
        Self {
            document_id: Some(document_id),
            ..Self::bare(RejectionKind::DocumentNotFound, action)
        }
    }

    pub fn stage_not_found(token: Uuid) -> Self {
        Self {
            token: Some(token),
            ..Self::bare(RejectionKind::StageNotFound, Action::Delete)
        }
    }

    /// Rejection about an existing document, optionally with a target.
    pub fn for_document(
        kind: RejectionKind,
        action: Action,
        document: &Document,
        target: Option<Target>,
    ) -> Self {
        Self {
            document_id: Some(document.id),
            document_name: Some(document.name.clone()),
            target,
            ..Self::bare(kind, action)
        }
    }

    /// Rejection about a document that does not exist yet (creation).
    pub fn for_new_document(
        kind: RejectionKind,
        document_name: &str,
        target: Option<Target>,
    ) -> Self {
        Self {
            document_name: Some(document_name.to_string()),
            target,
            ..Self::bare(kind, Action::Create)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_token(mut self, token: Uuid) -> Self {
        self.token = Some(token);
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn class(&self) -> RejectionClass {
        self.kind.class()
    }

    /// Whether re-invoking the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.class() == RejectionClass::StorageFault
    }

    /// Whether the intent is already satisfied.
    pub fn is_benign(&self) -> bool {
        self.class() == RejectionClass::BenignNoOp
    }

    fn document_label(&self) -> String {
        match (&self.document_name, self.document_id) {
            (Some(name), _) => format!("\"{}\"", name),
            (None, Some(id)) => format!("document #{}", id),
            (None, None) => "the document".to_string(),
        }
    }

    fn target_label(&self) -> String {
        self.target
            .as_ref()
            .map(Target::label)
            .unwrap_or_else(|| "the requested folder".to_string())
    }

    /// One short user-facing sentence naming the document and folder.
    pub fn message(&self) -> String {
        let doc = self.document_label();
        let target = self.target_label();
        let verb = self.action.past_participle();
        match self.kind {
            RejectionKind::InvalidRequest => match &self.detail {
                Some(detail) => format!("The request could not be processed: {}.", detail),
                None => "The request could not be processed.".to_string(),
            },
            RejectionKind::DocumentNotFound => match &self.target {
                Some(_) => format!(
                    "The document ({}) was not {} to {} because it no longer exists or was deleted; refresh and try again.",
                    doc, verb, target
                ),
                None => format!(
                    "The document ({}) no longer exists or was deleted; refresh and try again.",
                    doc
                ),
            },
            RejectionKind::FolderNotFound => format!(
                "{} was not {} because {} no longer exists or is inactive.",
                capitalize(&doc),
                verb,
                target
            ),
            RejectionKind::CompanyMismatch => format!(
                "{} belongs to a different company than {} and cannot be placed there.",
                capitalize(&doc),
                target
            ),
            RejectionKind::DepartmentMismatch => format!(
                "{} belongs to a different department than {} and cannot be placed there.",
                capitalize(&doc),
                target
            ),
            RejectionKind::AlreadyInFolder => match self.target {
                Some(Target::Unfiled) => format!("{} is already unfiled.", capitalize(&doc)),
                _ => format!("{} is already in {}.", capitalize(&doc), target),
            },
            RejectionKind::WriteFailure => format!(
                "{} could not be {} because of a storage error; please try again.",
                capitalize(&doc),
                verb
            ),
            RejectionKind::Conflict => format!(
                "{} was changed by someone else at the same time and was not {}; please try again.",
                capitalize(&doc),
                verb
            ),
            RejectionKind::ConfirmationRequired => format!(
                "Deleting {} must be confirmed: stage the request, then commit it.",
                doc
            ),
            RejectionKind::StageNotFound => {
                "This confirmation has expired or was already used; please start again."
                    .to_string()
            }
        }
    }
}

impl std::fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CompanyId, DepartmentId};
    use crate::models::DocumentStatus;

    fn report() -> Document {
        let now = Utc::now();
        Document {
            id: DocumentId::new(37).unwrap(),
            company_id: CompanyId::new(1).unwrap(),
            department_id: DepartmentId::new(2).unwrap(),
            folder_id: None,
            name: "Q3 report.pdf".to_string(),
            status: DocumentStatus::Active,
            size_bytes: 10,
            created_at: now,
            updated_at: now,
        }
    }

    fn contracts() -> Folder {
        Folder {
            id: FolderId::new(9).unwrap(),
            company_id: CompanyId::new(1).unwrap(),
            department_id: DepartmentId::new(5).unwrap(),
            name: "Contracts".to_string(),
            active: true,
        }
    }

    #[test]
    fn test_messages_name_document_and_folder() {
        let r = MoveRejection::for_document(
            RejectionKind::DepartmentMismatch,
            Action::Move,
            &report(),
            Some(Target::folder(&contracts())),
        );
        let msg = r.message();
        assert!(msg.contains("\"Q3 report.pdf\""), "{}", msg);
        assert!(msg.contains("folder \"Contracts\""), "{}", msg);
        assert!(msg.contains("different department"), "{}", msg);
    }

    #[test]
    fn test_already_unfiled_message() {
        let r = MoveRejection::for_document(
            RejectionKind::AlreadyInFolder,
            Action::Unfile,
            &report(),
            Some(Target::Unfiled),
        );
        assert_eq!(r.message(), "\"Q3 report.pdf\" is already unfiled.");
        assert!(r.is_benign());
        assert!(!r.is_retryable());
    }

    #[test]
    fn test_folder_label_falls_back_to_id() {
        let r = MoveRejection::for_document(
            RejectionKind::FolderNotFound,
            Action::Move,
            &report(),
            Some(Target::folder_id(FolderId::new(12345).unwrap())),
        );
        assert_eq!(
            r.message(),
            "\"Q3 report.pdf\" was not moved because folder #12345 no longer exists or is inactive."
        );
    }

    #[test]
    fn test_document_not_found_message_without_name() {
        let r = MoveRejection::document_not_found(Action::Move, DocumentId::new(9999).unwrap());
        assert!(r.message().contains("document #9999"));
        assert_eq!(r.class(), RejectionClass::NotFound);
    }

    #[test]
    fn test_document_not_found_names_intended_folder() {
        let r = MoveRejection::document_not_found(Action::Move, DocumentId::new(9999).unwrap())
            .with_target(Target::folder_id(FolderId::new(9).unwrap()));
        assert_eq!(
            r.message(),
            "The document (document #9999) was not moved to folder #9 because it no longer exists or was deleted; refresh and try again."
        );
    }

    #[test]
    fn test_retryable_classes() {
        let doc = report();
        for kind in [RejectionKind::WriteFailure, RejectionKind::Conflict] {
            let r = MoveRejection::for_document(kind, Action::Move, &doc, None);
            assert!(r.is_retryable(), "{:?} should be retryable", kind);
        }
        for kind in [
            RejectionKind::CompanyMismatch,
            RejectionKind::DepartmentMismatch,
            RejectionKind::FolderNotFound,
        ] {
            let r = MoveRejection::for_document(kind, Action::Move, &doc, None);
            assert!(!r.is_retryable(), "{:?} should not be retryable", kind);
        }
    }

    #[test]
    fn test_codes_are_snake_case() {
        assert_eq!(RejectionKind::AlreadyInFolder.code(), "already_in_folder");
        let json = serde_json::to_value(RejectionKind::CompanyMismatch).unwrap();
        assert_eq!(json, "company_mismatch");
    }

    #[test]
    fn test_move_result_message() {
        let result = MoveResult {
            document_id: DocumentId::new(37).unwrap(),
            document_name: "Q3 report.pdf".to_string(),
            folder_id: Some(FolderId::new(9).unwrap()),
            folder_name: "Contracts".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(
            result.message(),
            "\"Q3 report.pdf\" was moved to folder \"Contracts\"."
        );
    }
}
