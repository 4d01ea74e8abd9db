//! # folio-core
//!
//! Core types, traits, and placement logic for folio.
//!
//! This crate holds the entity model, the repository traits the storage
//! backends implement, the placement validator and the move operation built
//! on top of them. It has no HTTP or database code of its own.

pub mod defaults;
pub mod error;
pub mod events;
pub mod ids;
pub mod logging;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod models;
pub mod operations;
pub mod outcome;
pub mod placement;
pub mod resolution;
pub mod traits;
pub mod validator;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, PlacementEvent};
pub use ids::{CompanyId, DepartmentId, DocumentId, FolderId, InvalidId, RawId};
#[cfg(any(test, feature = "memory"))]
pub use memory::{MemoryStore, StoreCall};
pub use models::*;
pub use operations::{
    Completed, OperationOutcome, Operations, PlacementRequest, StagedOperation, StagingArea,
};
pub use outcome::{
    Action, DeleteResult, MoveOutcome, MoveRejection, MoveResult, RejectionClass, RejectionKind,
    Target, UNFILED_LABEL,
};
pub use placement::{CreateOutcome, DeleteOutcome, PlacementService};
pub use resolution::{
    AuthoritativeIdResolver, DocumentHandle, DocumentResolver, Resolution, UnresolvedReason,
    DOCUMENT_ID_ATTRIBUTE,
};
pub use traits::*;
pub use validator::Violation;
