//! # Validation Module
//!
//! Pre-flight validation for host-supplied configuration.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host application                                             │
//! │  ├── Supplies TableConfig list + Credentials per invocation            │
//! │  └── May pre-validate for immediate user feedback                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any I/O)                                 │
//! │  ├── Required fields present                                           │
//! │  ├── Identifiers safe to splice into SQL                               │
//! │  └── Select queries are read-only                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  └── Schema constraints on the shadow table                            │
//! │                                                                         │
//! │  A config that fails Layer 2 aborts the run with NO database or        │
//! │  network access and NO retry.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Credentials, TableConfig};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validation
// =============================================================================

/// Returns true if `name` is safe to splice into a SQL statement as a
/// table or column identifier.
///
/// ## Rules
/// - Non-empty
/// - First character: ASCII letter or underscore
/// - Remaining characters: ASCII alphanumeric or underscore
///
/// Identifiers cannot be bound as statement parameters, so anything not
/// matching this shape is rejected outright rather than escaped.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validates a SQL identifier, returning it on success.
pub fn validate_identifier(name: &str) -> ValidationResult<&str> {
    if is_valid_identifier(name) {
        Ok(name)
    } else {
        Err(ValidationError::InvalidIdentifier { name: name.into() })
    }
}

// =============================================================================
// Config Validation
// =============================================================================

/// Validates one table configuration.
///
/// ## Rules
/// - `name` and `shadow_table` are valid SQL identifiers
/// - `select_query` is non-empty and starts with SELECT (read-only)
/// - `remote_table_id` is non-empty
/// - `endpoint` is non-empty (URL shape is checked by the engine layer,
///   which owns the `url` dependency)
pub fn validate_table_config(config: &TableConfig) -> ValidationResult<()> {
    if config.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".into(),
        });
    }
    validate_identifier(&config.name)?;
    validate_identifier(&config.shadow_table)?;

    let query = config.select_query.trim();
    if query.is_empty() {
        return Err(ValidationError::Required {
            field: "select_query".into(),
        });
    }
    if !is_select(query) {
        return Err(ValidationError::NotReadOnly {
            table: config.name.clone(),
        });
    }

    if config.remote_table_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "remote_table_id".into(),
        });
    }

    if config.endpoint.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "endpoint".into(),
        });
    }

    Ok(())
}

/// Validates the credential bundle.
///
/// Only the fields the remote API authenticates with are required; the
/// remaining headers are forwarded even when empty.
pub fn validate_credentials(credentials: &Credentials) -> ValidationResult<()> {
    if credentials.authorization.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "authorization".into(),
        });
    }

    if credentials.package_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "package_id".into(),
        });
    }

    Ok(())
}

/// Returns true if the trimmed query starts with the SELECT keyword.
fn is_select(query: &str) -> bool {
    let mut words = query.split_whitespace();
    matches!(words.next(), Some(first) if first.eq_ignore_ascii_case("select"))
}

// =============================================================================
// Tests
// =============================================================================
