//! # Sync Configuration
//!
//! Engine settings and the per-run request shape.
//!
//! ## Two Layers of Input
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Configuration Layers                             │
//! │                                                                         │
//! │  SyncSettings (engine lifetime)                                        │
//! │  ──────────────────────────────                                        │
//! │  • batch_size: rows per page (default 5000)                            │
//! │  • max_retries: whole-run attempts before giving up (default 5)        │
//! │  • retry_delay: fixed delay between attempts (default 5s)              │
//! │  • connect/request timeouts for the HTTP client (default 30s each)     │
//! │  • rewrap_columns: JSON-wrap quirk applied on read                     │
//! │                                                                         │
//! │  SyncRequest (per run)                                                 │
//! │  ─────────────────────                                                 │
//! │  • database_path: the local SQLite file to read from                   │
//! │  • tables: ordered list of TableConfig to sync                         │
//! │  • credentials: headers attached to every delivery                     │
//! │                                                                         │
//! │  The engine never reads configuration from disk or from global        │
//! │  state. Everything a run needs travels inside the request.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use relay_core::{
    validate_credentials, validate_table_config, Credentials, TableConfig, ValidationError,
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_SECS,
};

use crate::error::{SyncError, SyncResult};

/// Default connect and request timeout for the remote API, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Sync Settings
// =============================================================================

/// Engine-lifetime tuning knobs.
///
/// Settings are validated once when the engine is constructed; a bad
/// value is a configuration error, not something to retry.
///
/// ## Example
/// ```rust,no_run
/// use relay_sync::SyncSettings;
/// use std::time::Duration;
///
/// let settings = SyncSettings::new()
///     .with_batch_size(1000)
///     .with_max_retries(3)
///     .with_retry_delay(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Maximum rows read and sent per page.
    pub batch_size: usize,

    /// Total whole-run attempts before the schedule controller gives up.
    pub max_retries: u32,

    /// Fixed delay between whole-run attempts.
    pub retry_delay: Duration,

    /// TCP connect timeout for the HTTP client.
    pub connect_timeout: Duration,

    /// Full request timeout for the HTTP client.
    pub request_timeout: Duration,

    /// Column names whose string values get rewrapped as `{"<v>":<v>}`
    /// during page reads. Matches the remote API's expected shape for
    /// progress payload columns.
    pub rewrap_columns: Vec<String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            rewrap_columns: Vec::new(),
        }
    }
}

impl SyncSettings {
    /// Creates settings with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size for local reads and remote deliveries.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the total number of whole-run attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the fixed delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the HTTP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the columns whose values get the rewrap treatment on read.
    pub fn with_rewrap_columns(mut self, columns: Vec<String>) -> Self {
        self.rewrap_columns = columns;
        self
    }

    /// Validates the settings.
    pub fn validate(&self) -> SyncResult<()> {
        if self.batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(SyncError::InvalidConfig(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Sync Request
// =============================================================================

/// Everything one sync run needs, passed explicitly.
///
/// The request is `Serialize`/`Deserialize` so a host can persist it
/// (e.g. into a durable task queue) and replay it verbatim later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Path to the local SQLite database. Must already exist.
    pub database_path: PathBuf,

    /// Tables to sync, in order. An empty list is a valid (trivially
    /// successful) run.
    pub tables: Vec<TableConfig>,

    /// Credentials attached to every HTTP delivery in this run.
    pub credentials: Credentials,
}

impl SyncRequest {
    /// Creates a request for the given database and tables.
    pub fn new(
        database_path: impl Into<PathBuf>,
        tables: Vec<TableConfig>,
        credentials: Credentials,
    ) -> Self {
        Self {
            database_path: database_path.into(),
            tables,
            credentials,
        }
    }

    /// Validates the whole request before any I/O happens.
    ///
    /// Checks every table config, every endpoint URL, and the
    /// credentials. Runs with invalid requests never start.
    pub fn validate(&self) -> SyncResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(SyncError::InvalidConfig(
                "database_path must not be empty".to_string(),
            ));
        }
        for table in &self.tables {
            validate_table_config(table)?;
            validate_endpoint(table)?;
        }
        validate_credentials(&self.credentials)?;
        Ok(())
    }
}

/// Checks that a table's endpoint parses as an absolute http(s) URL.
fn validate_endpoint(table: &TableConfig) -> SyncResult<()> {
    let url = Url::parse(&table.endpoint).map_err(|e| {
        SyncError::Validation(ValidationError::InvalidEndpoint {
            table: table.name.clone(),
            reason: e.to_string(),
        })
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SyncError::Validation(ValidationError::InvalidEndpoint {
            table: table.name.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            fingerprint: "fp-1".to_string(),
            authorization: "Bearer token".to_string(),
            package_id: "com.example.app".to_string(),
            device_type: "desktop".to_string(),
            version: "1.0.0".to_string(),
        }
    }

    fn table() -> TableConfig {
        TableConfig::new(
            "progress",
            "progress_copy",
            "SELECT * FROM progress",
            "user_progress",
            "https://api.example.com/sync",
        )
    }

    #[test]
    fn test_default_settings() {
        let settings = SyncSettings::default();
        assert_eq!(settings.batch_size, 5000);
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.retry_delay, Duration::from_secs(5));
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let settings = SyncSettings::new().with_batch_size(0);
        assert!(matches!(
            settings.validate(),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_max_retries_rejected() {
        let settings = SyncSettings::new().with_max_retries(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_valid_request_passes() {
        let request = SyncRequest::new("/tmp/relay.db", vec![table()], credentials());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_table_list_is_valid() {
        let request = SyncRequest::new("/tmp/relay.db", vec![], credentials());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let request = SyncRequest::new("", vec![table()], credentials());
        assert!(matches!(
            request.validate(),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let mut bad = table();
        bad.endpoint = "/sync".to_string();
        let request = SyncRequest::new("/tmp/relay.db", vec![bad], credentials());
        assert!(matches!(
            request.validate(),
            Err(SyncError::Validation(ValidationError::InvalidEndpoint { .. }))
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut bad = table();
        bad.endpoint = "ftp://api.example.com/sync".to_string();
        let request = SyncRequest::new("/tmp/relay.db", vec![bad], credentials());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_injection_in_table_name_rejected() {
        let mut bad = table();
        bad.shadow_table = "progress_copy; DROP TABLE progress".to_string();
        let request = SyncRequest::new("/tmp/relay.db", vec![bad], credentials());
        assert!(matches!(
            request.validate(),
            Err(SyncError::Validation(_))
        ));
    }

    #[test]
    fn test_request_serde_round_trip() {
        let request = SyncRequest::new("/tmp/relay.db", vec![table()], credentials());
        let json = serde_json::to_string(&request).unwrap();
        let back: SyncRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.database_path, request.database_path);
        assert_eq!(back.tables.len(), 1);
        assert_eq!(back.tables[0].name, "progress");
    }
}
