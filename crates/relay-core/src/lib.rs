//! # relay-core: Pure Types for the Relay Sync Engine
//!
//! This crate contains the data model shared by every layer of the sync
//! engine, defined as plain values with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Relay Architecture                              │
//! │                                                                         │
//! │  Host application (lifecycle hooks, durable task queue)                │
//! │       │  start_sync(tables, credentials)                               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    relay-sync (engine)                          │   │
//! │  │    ScheduleController ─► SyncRunner ─► TableOrchestrator        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ relay-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌───────────┐                │   │
//! │  │   │   types   │  │ validation  │  │   error   │                │   │
//! │  │   │TableConfig│  │ identifiers │  │Validation │                │   │
//! │  │   │ RunReport │  │ read-only   │  │  Error    │                │   │
//! │  │   └───────────┘  └─────────────┘  └───────────┘                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE VALUES              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    relay-db (Local Store)                       │   │
//! │  │         SQLite paginated reads, transactional upserts           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (TableConfig, Credentials, Record, RunReport)
//! - [`validation`] - Table config and identifier validation
//! - [`error`] - Validation error types
//!
//! ## Design Principles
//!
//! 1. **Pure Values**: Configs are immutable snapshots built per invocation
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Serializable**: Every config type round-trips through serde so the
//!    host's durable task queue can persist it between invocations
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use relay_core::TableConfig` instead of
// `use relay_core::types::TableConfig`

pub use error::ValidationError;
pub use types::*;
pub use validation::{
    is_valid_identifier, validate_credentials, validate_identifier, validate_table_config,
    ValidationResult,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default page size for paginated reads.
///
/// ## Why 5000?
/// Large enough to amortize the per-request HTTP overhead on big tables,
/// small enough that one materialized page stays well under typical mobile
/// memory budgets. The engine treats this as a configurable constant; every
/// table in a run shares the same page size.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Default maximum number of whole-run attempts before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default delay between whole-run retry attempts, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
