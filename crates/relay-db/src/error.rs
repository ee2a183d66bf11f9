//! # Database Error Types
//!
//! Error types for local store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError (relay-sync) ← Fatal for the current table only            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TableOutcome.failed = true, run continues with the next table         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use thiserror::Error;

use relay_core::ValidationError;

/// Local store operation errors.
///
/// These errors wrap sqlx errors and provide additional context. None of
/// them are silently swallowed: a failed write-back batch surfaces here
/// and marks the owning table's outcome as failed.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database file does not exist and creation was not requested.
    ///
    /// ## When This Occurs
    /// - Host supplied a wrong database path
    /// - The host app has not created its database yet
    ///
    /// Treated as a configuration error: surfaced before any sync I/O,
    /// never retried.
    #[error("Database file not found: {0}")]
    DatabaseMissing(PathBuf),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - File permissions issue
    /// - Disk full
    /// - Database locked beyond the busy timeout
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - Host-supplied SELECT references a missing table or column
    /// - Runtime SQL error
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Write-back transaction failed; no rows from the batch were committed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A table or column identifier failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed (with SQLite message)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::QueryFailed(format!("Failed to decode column {}: {}", index, source))
            }
            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for local store operations.
pub type DbResult<T> = Result<T, DbError>;
