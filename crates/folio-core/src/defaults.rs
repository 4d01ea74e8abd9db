//! Centralized default constants for folio.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for document listings.
pub const PAGE_LIMIT: i64 = 50;

/// Upper bound a client may request for a single page.
pub const PAGE_LIMIT_MAX: i64 = 500;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// STAGING
// =============================================================================

/// Lifetime of a staged operation before it must be re-staged.
pub const STAGE_TTL_SECS: u64 = 300;

/// Maximum number of staged operations held in memory at once.
pub const STAGE_CAPACITY: usize = 10_000;

// =============================================================================
// EVENTS
// =============================================================================

/// Broadcast buffer size for the placement event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum accepted request body (placement requests are tiny).
pub const REQUEST_BODY_LIMIT_BYTES: usize = 64 * 1024;

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum number of pooled connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default pool acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle connection timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;
