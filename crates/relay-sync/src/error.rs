//! # Sync Error Types
//!
//! Error types for the sync engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Database     │  │      Transport          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Database       │  │  ClientBuildFailed      │ │
//! │  │  Validation     │  │  (wraps DbError)│  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │   Lifecycle     │  │  NOTE: page send failures and cancellation  │  │
//! │  │                 │  │  are NOT errors. They surface as failed     │  │
//! │  │  Internal       │  │  tables in the RunReport; SyncError is for  │  │
//! │  │                 │  │  conditions that abort a whole run.         │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use relay_core::ValidationError;
use relay_db::DbError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type for conditions that abort a whole run.
///
/// ## Design Principles
/// - Configuration errors must be distinguishable: retrying them is useless
/// - Per-page failures never become errors; they are reported per table
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine settings or request shape.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Table config or credential validation failed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Database Errors
    // =========================================================================
    /// Local store failure while opening or closing the database.
    ///
    /// A missing database file counts as a configuration error (the host
    /// handed us a bad path); everything else is transient.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuildFailed(String),

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    /// Internal invariant violation.
    #[error("Internal sync error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Whether this error reflects bad input rather than a transient fault.
    ///
    /// Configuration errors are surfaced immediately and never retried.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::Validation(_)
                | SyncError::ClientBuildFailed(_)
                | SyncError::Database(DbError::DatabaseMissing(_))
        )
    }

    /// Whether a later attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !self.is_config_error()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_database_is_config_error() {
        let err = SyncError::from(DbError::DatabaseMissing(PathBuf::from("/nope.db")));
        assert!(err.is_config_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_transient_database_error_is_retryable() {
        let err = SyncError::from(DbError::QueryFailed("locked".to_string()));
        assert!(!err.is_config_error());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_error_is_config_error() {
        let err = SyncError::from(ValidationError::InvalidIdentifier {
            name: "users; DROP TABLE".to_string(),
        });
        assert!(err.is_config_error());
    }

    #[test]
    fn test_internal_error_is_retryable() {
        let err = SyncError::Internal("retry loop made no attempts".to_string());
        assert!(err.is_retryable());
        assert!(!err.is_config_error());
    }
}
