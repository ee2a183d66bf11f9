//! # relay-db: Local Store Layer for Relay
//!
//! This crate provides database access for the sync engine. It uses SQLite
//! for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Relay Data Flow                                │
//! │                                                                         │
//! │  relay-sync (orchestrator loop)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     relay-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │     Store     │    │  PageReader   │    │ ShadowWriter │  │   │
//! │  │   │   (pool.rs)   │    │ (paginated    │    │ (insert-or-  │  │   │
//! │  │   │               │    │  SELECTs)     │    │  replace,    │  │   │
//! │  │   │ SqlitePool    │◄───│ LIMIT/OFFSET  │    │  one txn per │  │   │
//! │  │   │ WAL mode      │    │ as bind args  │    │  batch)      │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Host application's SQLite database                 │   │
//! │  │      source tables (read-only) + shadow tables (write-back)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`error`] - Database error types
//! - [`repository`] - Page reader and shadow writer
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_db::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("path/to/app.db")).await?;
//!
//! let page = store.pages().read_page("SELECT * FROM progress", 0, 5000).await?;
//! let written = store.shadow().upsert("progress_copy", &records).await?;
//!
//! store.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::page::PageReader;
pub use repository::shadow::ShadowWriter;
