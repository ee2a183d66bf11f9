//! # Domain Types
//!
//! Value types that flow through one synchronization run.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Per-Invocation Lifecycle                         │
//! │                                                                         │
//! │  Host / durable task queue                                             │
//! │       │ deserializes TableConfig list + Credentials                    │
//! │       ▼                                                                 │
//! │  start_sync(tables, credentials)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  per table:  Page (Vec<Record>) ──► remote API ──► RemoteResponse      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TableOutcome per table ──► RunReport ──► retry decision               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Configs are DISCARDED. Nothing here persists across invocations.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Records
// =============================================================================

/// One row as read from the local store or returned by the remote API.
///
/// Column name → nullable JSON scalar (string, number, bool, or null).
/// Key order is preserved so the wire payload matches the column order of
/// the originating query.
pub type Record = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Table Configuration
// =============================================================================

/// Describes one table to synchronize.
///
/// Immutable: built fresh from host-supplied configuration at the start of
/// each scheduled invocation and discarded when the invocation ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Local table name (used for logging and outcome reporting).
    pub name: String,

    /// Local shadow table that receives write-back rows from the remote
    /// response. Must share its natural primary key with the response rows.
    pub shadow_table: String,

    /// Read-only SELECT statement producing the rows to upload.
    /// The store appends `LIMIT ? OFFSET ?` for pagination.
    pub select_query: String,

    /// Table identifier the remote API expects in the request body.
    pub remote_table_id: String,

    /// Absolute http(s) URL of the remote endpoint for this table.
    pub endpoint: String,
}

impl TableConfig {
    /// Creates a new table configuration.
    pub fn new(
        name: impl Into<String>,
        shadow_table: impl Into<String>,
        select_query: impl Into<String>,
        remote_table_id: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        TableConfig {
            name: name.into(),
            shadow_table: shadow_table.into(),
            select_query: select_query.into(),
            remote_table_id: remote_table_id.into(),
            endpoint: endpoint.into(),
        }
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Opaque credential bundle attached to every remote call as headers.
///
/// Supplied once per run by the host and treated as pass-through: the
/// engine never inspects, refreshes, or persists these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Device fingerprint (`Fingerprint` header).
    pub fingerprint: String,

    /// Authorization token, sent verbatim (`Authorization` header).
    pub authorization: String,

    /// Application package identifier (`X-Package-ID` header).
    pub package_id: String,

    /// Device type tag (`Device-Type` header).
    pub device_type: String,

    /// Client version string (`Version` header).
    pub version: String,
}

// =============================================================================
// Remote Response
// =============================================================================

/// Outcome of delivering one page to the remote API.
///
/// The remote client never throws: transport failures, non-2xx statuses,
/// and malformed bodies all collapse into `success == false` with absent
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    /// Whether the page was accepted (2xx with a parseable body).
    pub success: bool,

    /// Rows to upsert into the shadow table. `None` when the response had
    /// no `data` array or the call failed.
    pub records: Option<Vec<Record>>,
}

impl RemoteResponse {
    /// Successful delivery with write-back rows.
    pub fn ok(records: Vec<Record>) -> Self {
        RemoteResponse {
            success: true,
            records: Some(records),
        }
    }

    /// Successful delivery, nothing to write back.
    pub fn accepted() -> Self {
        RemoteResponse {
            success: true,
            records: None,
        }
    }

    /// Failed delivery (transport, status, or parse failure).
    pub fn failed() -> Self {
        RemoteResponse {
            success: false,
            records: None,
        }
    }

    /// Returns true if there are rows to write back.
    pub fn has_records(&self) -> bool {
        self.records.as_ref().is_some_and(|r| !r.is_empty())
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of synchronizing one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOutcome {
    /// Local table name from the TableConfig.
    pub table_name: String,

    /// Total rows delivered to the remote API (sum of sent page lengths).
    pub rows_sent: u64,

    /// Total rows upserted into the shadow table.
    pub rows_written_back: u64,

    /// True if any page send, write-back, or read failed for this table.
    pub failed: bool,
}

impl TableOutcome {
    /// Creates an empty outcome for a table that has not been processed.
    pub fn new(table_name: impl Into<String>) -> Self {
        TableOutcome {
            table_name: table_name.into(),
            rows_sent: 0,
            rows_written_back: 0,
            failed: false,
        }
    }

    /// Returns true if the table completed without any failure.
    pub fn succeeded(&self) -> bool {
        !self.failed
    }
}

/// Result of one full run across all configured tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier, for correlating log lines of one pass.
    pub run_id: String,

    /// When the run started (UTC).
    pub started_at: DateTime<Utc>,

    /// When the run finished (UTC).
    pub finished_at: DateTime<Utc>,

    /// Per-table outcomes, in configured table order.
    pub outcomes: Vec<TableOutcome>,
}

impl RunReport {
    /// Creates a report for a run starting now.
    pub fn begin() -> Self {
        let now = Utc::now();
        RunReport {
            run_id: Uuid::new_v4().to_string(),
            started_at: now,
            finished_at: now,
            outcomes: Vec::new(),
        }
    }

    /// Records a table outcome and returns self for chaining.
    pub fn record(&mut self, outcome: TableOutcome) {
        self.outcomes.push(outcome);
    }

    /// Stamps the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Logical AND of all per-table success flags.
    ///
    /// An empty run (no tables configured) counts as success.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(TableOutcome::succeeded)
    }

    /// Total rows sent across all tables.
    pub fn total_rows_sent(&self) -> u64 {
        self.outcomes.iter().map(|o| o.rows_sent).sum()
    }

    /// Total rows written back across all tables.
    pub fn total_rows_written_back(&self) -> u64 {
        self.outcomes.iter().map(|o| o.rows_written_back).sum()
    }

    /// Names of tables that failed, in run order.
    pub fn failed_tables(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.failed)
            .map(|o| o.table_name.as_str())
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
