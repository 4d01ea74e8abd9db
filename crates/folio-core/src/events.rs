//! Placement event types, envelope schema, and event bus.
//!
//! Successful placements (create, move, unfile, delete) are announced on a
//! single broadcast channel. Downstream consumers (log mirror, cache
//! invalidation, UI push) subscribe independently. Events are notifications
//! only; they are not a move history and nothing replays them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ids::{CompanyId, DepartmentId, DocumentId, FolderId};

// ============================================================================
// Event Envelope
// ============================================================================

/// Versioned envelope around a [`PlacementEvent`].
///
/// `event_type` uses dot-namespaced names (`"document.moved"`). Consumers
/// should ignore unknown fields.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type.
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Company scope of the affected document.
    pub company_id: CompanyId,
    /// Department scope of the affected document.
    pub department_id: DepartmentId,
    /// Payload schema version.
    pub payload_version: u32,
    /// Domain-specific event data.
    pub payload: PlacementEvent,
}

impl EventEnvelope {
    pub fn new(event: PlacementEvent) -> Self {
        let (company_id, department_id) = event.scope();
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.namespaced_event_type().to_string(),
            occurred_at: Utc::now(),
            company_id,
            department_id,
            payload_version: 1,
            payload: event,
        }
    }
}

// ============================================================================
// Placement Event (domain payloads)
// ============================================================================

/// Serialized with a `type` tag, e.g.
/// `{"type":"DocumentMoved","document_id":37,"to_folder_id":9,...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PlacementEvent {
    DocumentCreated {
        document_id: DocumentId,
        company_id: CompanyId,
        department_id: DepartmentId,
        #[serde(skip_serializing_if = "Option::is_none")]
        folder_id: Option<FolderId>,
    },
    DocumentMoved {
        document_id: DocumentId,
        company_id: CompanyId,
        department_id: DepartmentId,
        #[serde(skip_serializing_if = "Option::is_none")]
        from_folder_id: Option<FolderId>,
        to_folder_id: FolderId,
    },
    DocumentUnfiled {
        document_id: DocumentId,
        company_id: CompanyId,
        department_id: DepartmentId,
        from_folder_id: FolderId,
    },
    DocumentDeleted {
        document_id: DocumentId,
        company_id: CompanyId,
        department_id: DepartmentId,
    },
}

impl PlacementEvent {
    /// Namespaced event type for the envelope.
    pub fn namespaced_event_type(&self) -> &'static str {
        match self {
            PlacementEvent::DocumentCreated { .. } => "document.created",
            PlacementEvent::DocumentMoved { .. } => "document.moved",
            PlacementEvent::DocumentUnfiled { .. } => "document.unfiled",
            PlacementEvent::DocumentDeleted { .. } => "document.deleted",
        }
    }

    pub fn document_id(&self) -> DocumentId {
        match self {
            PlacementEvent::DocumentCreated { document_id, .. }
            | PlacementEvent::DocumentMoved { document_id, .. }
            | PlacementEvent::DocumentUnfiled { document_id, .. }
            | PlacementEvent::DocumentDeleted { document_id, .. } => *document_id,
        }
    }

    fn scope(&self) -> (CompanyId, DepartmentId) {
        match self {
            PlacementEvent::DocumentCreated {
                company_id,
                department_id,
                ..
            }
            | PlacementEvent::DocumentMoved {
                company_id,
                department_id,
                ..
            }
            | PlacementEvent::DocumentUnfiled {
                company_id,
                department_id,
                ..
            }
            | PlacementEvent::DocumentDeleted {
                company_id,
                department_id,
                ..
            } => (*company_id, *department_id),
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus for placement notifications.
///
/// Slow receivers that fall behind get a `Lagged` error and miss events.
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently when nobody listens.
    pub fn emit(&self, event: PlacementEvent) {
        let envelope = EventEnvelope::new(event);
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count,
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive enveloped events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}
