//! # Error Types
//!
//! Validation error types for relay-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  relay-core errors (this file)                                         │
//! │  └── ValidationError  - Config/input validation failures               │
//! │                                                                         │
//! │  relay-db errors (separate crate)                                      │
//! │  └── DbError          - Local store operation failures                 │
//! │                                                                         │
//! │  relay-sync errors (separate crate)                                    │
//! │  └── SyncError        - Run-level failures, wraps the two above        │
//! │                                                                         │
//! │  Flow: ValidationError → SyncError → RunReport → host application      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Configuration validation errors.
///
/// These occur before any I/O: a run that fails validation never touches
/// the database or the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    ///
    /// ## When This Occurs
    /// - Host supplied a TableConfig with an empty table name
    /// - Credentials arrived without an authorization token
    #[error("Required field is empty: {field}")]
    Required { field: String },

    /// A table or column name contains characters that cannot be safely
    /// spliced into a SQL statement.
    ///
    /// ## Why This Exists
    /// Identifiers cannot be bound as parameters, so they are validated
    /// instead of escaped. Rejecting here closes the injection hole that
    /// string-concatenated INSERT statements would open.
    #[error("Invalid SQL identifier: '{name}'")]
    InvalidIdentifier { name: String },

    /// The configured select query is not a read-only SELECT statement.
    ///
    /// ## When This Occurs
    /// - Host supplied `DELETE FROM users` as a select query
    /// - Query starts with a CTE keyword the engine does not accept
    #[error("Select query for table '{table}' must be a SELECT statement")]
    NotReadOnly { table: String },

    /// The remote endpoint is not an absolute http(s) URL.
    #[error("Invalid remote endpoint for table '{table}': {reason}")]
    InvalidEndpoint { table: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = ValidationError::Required {
            field: "select_query".into(),
        };
        assert!(err.to_string().contains("select_query"));

        let err = ValidationError::InvalidIdentifier {
            name: "users; DROP TABLE users".into(),
        };
        assert!(err.to_string().contains("DROP TABLE"));
    }
}
