//! Resolving on-screen document representations to identifiers.
//!
//! A resolver either yields an authoritative [`DocumentId`] or says it could
//! not. It never guesses from display text, element position or any other
//! non-authoritative signal.

use std::collections::HashMap;

use crate::ids::{DocumentId, RawId};
use crate::models::DocumentView;

/// Attribute carrying the authoritative document id in rendered markup.
pub const DOCUMENT_ID_ATTRIBUTE: &str = "data-document-id";

/// What a client knows about a rendered document element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHandle {
    /// Value of [`DOCUMENT_ID_ATTRIBUTE`], if present.
    pub document_id_attr: Option<String>,
    /// Visible text of the element. Never used for resolution.
    pub display_text: Option<String>,
}

impl DocumentHandle {
    /// Build from an element's attribute map and visible text.
    pub fn from_attributes(attributes: &HashMap<String, String>, display_text: Option<&str>) -> Self {
        Self {
            document_id_attr: attributes.get(DOCUMENT_ID_ATTRIBUTE).cloned(),
            display_text: display_text.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The handle carries no identifier (or only whitespace).
    Missing,
    /// The identifier is present but not a positive integer.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(DocumentId),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn document_id(&self) -> Option<DocumentId> {
        match self {
            Resolution::Resolved(id) => Some(*id),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// Maps a document handle to an identifier.
pub trait DocumentResolver: Send + Sync {
    fn resolve(&self, handle: &DocumentHandle) -> Resolution;
}

/// Reads only the authoritative id attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthoritativeIdResolver;

impl DocumentResolver for AuthoritativeIdResolver {
    fn resolve(&self, handle: &DocumentHandle) -> Resolution {
        let raw = match handle.document_id_attr.as_deref() {
            Some(value) if !value.trim().is_empty() => value,
            _ => return Resolution::Unresolved(UnresolvedReason::Missing),
        };
        match DocumentId::coerce(&RawId::from(raw)) {
            Some(id) => Resolution::Resolved(id),
            None => Resolution::Unresolved(UnresolvedReason::Malformed(raw.to_string())),
        }
    }
}

impl DocumentView {
    /// Attributes a renderer must put on the element showing this document.
    pub fn render_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![(DOCUMENT_ID_ATTRIBUTE, self.document_id.to_string())];
        if let Some(folder_id) = self.folder_id {
            attrs.push(("data-folder-id", folder_id.to_string()));
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CompanyId, DepartmentId, FolderId};
    use crate::models::DocumentStatus;
    use chrono::Utc;

    fn handle(attr: Option<&str>, text: &str) -> DocumentHandle {
        DocumentHandle {
            document_id_attr: attr.map(str::to_string),
            display_text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_resolves_authoritative_attribute() {
        let r = AuthoritativeIdResolver.resolve(&handle(Some("37"), "Q3 report.pdf"));
        assert_eq!(r, Resolution::Resolved(DocumentId::new(37).unwrap()));
    }

    #[test]
    fn test_missing_attribute_is_unresolved_even_with_numeric_text() {
        let r = AuthoritativeIdResolver.resolve(&handle(None, "Document 37"));
        assert_eq!(r, Resolution::Unresolved(UnresolvedReason::Missing));

        let r = AuthoritativeIdResolver.resolve(&handle(Some("   "), "37"));
        assert_eq!(r, Resolution::Unresolved(UnresolvedReason::Missing));
        assert_eq!(r.document_id(), None);
    }

    #[test]
    fn test_malformed_attribute() {
        for raw in ["0", "-4", "doc-37", "3.5"] {
            let r = AuthoritativeIdResolver.resolve(&handle(Some(raw), "x"));
            assert_eq!(
                r,
                Resolution::Unresolved(UnresolvedReason::Malformed(raw.to_string()))
            );
        }
    }

    #[test]
    fn test_rendered_attributes_resolve_back() {
        let view = DocumentView {
            document_id: DocumentId::new(37).unwrap(),
            company_id: CompanyId::new(1).unwrap(),
            department_id: DepartmentId::new(2).unwrap(),
            folder_id: FolderId::new(9),
            name: "Q3 report.pdf".to_string(),
            status: DocumentStatus::Active,
            size_bytes: 0,
            updated_at: Utc::now(),
        };
        let attributes: HashMap<String, String> = view
            .render_attributes()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(attributes["data-folder-id"], "9");

        let handle = DocumentHandle::from_attributes(&attributes, Some(&view.name));
        assert_eq!(
            AuthoritativeIdResolver.resolve(&handle).document_id(),
            Some(view.document_id)
        );
    }
}
