//! Structured logging schema and field name constants for folio.
//!
//! All crates use these names for structured logging fields so log
//! aggregation tools can query by the same keys across every subsystem.
//! `tracing` macros need literal field names, so the constants document the
//! schema and are used where fields are recorded dynamically.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (write conflict, storage fault on a move) |
//! | INFO  | Lifecycle events, completed placements |
//! | DEBUG | Rejected placements, decision points |
//! | TRACE | Per-row iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the HTTP layer (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "placement", "database", "staging", "events"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "documents", "folders", "move"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "move", "unfile", "stage", "commit"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document being placed.
pub const DOCUMENT_ID: &str = "document_id";

/// Target folder of a placement.
pub const FOLDER_ID: &str = "folder_id";

/// Company scope.
pub const COMPANY_ID: &str = "company_id";

/// Department scope.
pub const DEPARTMENT_ID: &str = "department_id";

/// Staging token.
pub const STAGE_TOKEN: &str = "stage_token";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned by a listing.
pub const RESULT_COUNT: &str = "result_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Machine-readable rejection code (e.g. "company_mismatch").
pub const REJECTION: &str = "rejection";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
