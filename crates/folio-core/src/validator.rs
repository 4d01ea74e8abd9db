//! Placement rules.
//!
//! Pure functions with no store access. Rules are checked in a fixed order
//! and the first failing rule decides the verdict:
//!
//! 1. the document exists and is not deleted
//! 2. the folder exists and is active
//! 3. document and folder belong to the same company
//! 4. document and folder belong to the same department
//! 5. the document is not already in the folder

use crate::models::{Document, Folder, NewDocument};
use crate::outcome::RejectionKind;

/// The rule a placement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    DocumentMissing,
    FolderMissing,
    CompanyMismatch,
    DepartmentMismatch,
    AlreadyPlaced,
}

impl Violation {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Violation::DocumentMissing => RejectionKind::DocumentNotFound,
            Violation::FolderMissing => RejectionKind::FolderNotFound,
            Violation::CompanyMismatch => RejectionKind::CompanyMismatch,
            Violation::DepartmentMismatch => RejectionKind::DepartmentMismatch,
            Violation::AlreadyPlaced => RejectionKind::AlreadyInFolder,
        }
    }
}

/// Decide whether `document` may be placed into `folder`.
///
/// `None` stands for a record the store did not return (absent, deleted or
/// inactive).
pub fn validate(document: Option<&Document>, folder: Option<&Folder>) -> Result<(), Violation> {
    let document = live_document(document)?;
    let folder = active_folder(folder)?;
    check_scope(document.company_id, document.department_id, folder)?;
    if document.folder_id == Some(folder.id) {
        return Err(Violation::AlreadyPlaced);
    }
    Ok(())
}

/// Decide whether `document` may be moved to the root of its department.
pub fn validate_unfile(document: Option<&Document>) -> Result<(), Violation> {
    let document = live_document(document)?;
    if document.folder_id.is_none() {
        return Err(Violation::AlreadyPlaced);
    }
    Ok(())
}

/// Check the initial folder of a document being created.
///
/// `folder` is the folder the store returned for `new.folder_id`; it is
/// ignored when the document is created unfiled.
pub fn validate_initial_placement(
    new: &NewDocument,
    folder: Option<&Folder>,
) -> Result<(), Violation> {
    if new.folder_id.is_none() {
        return Ok(());
    }
    let folder = active_folder(folder)?;
    check_scope(new.company_id, new.department_id, folder)
}

/// Whether `folder` is a legal drop target for `document`, ignoring its
/// current placement.
pub fn is_reachable(document: &Document, folder: &Folder) -> bool {
    folder.active && check_scope(document.company_id, document.department_id, folder).is_ok()
}

fn live_document(document: Option<&Document>) -> Result<&Document, Violation> {
    match document {
        Some(doc) if !doc.status.is_deleted() => Ok(doc),
        _ => Err(Violation::DocumentMissing),
    }
}

fn active_folder(folder: Option<&Folder>) -> Result<&Folder, Violation> {
    match folder {
        Some(f) if f.active => Ok(f),
        _ => Err(Violation::FolderMissing),
    }
}

fn check_scope(
    company_id: crate::CompanyId,
    department_id: crate::DepartmentId,
    folder: &Folder,
) -> Result<(), Violation> {
    if company_id != folder.company_id {
        return Err(Violation::CompanyMismatch);
    }
    if department_id != folder.department_id {
        return Err(Violation::DepartmentMismatch);
    }
    Ok(())
}
