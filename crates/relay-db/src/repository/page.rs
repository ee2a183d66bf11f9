//! # Page Reader
//!
//! Paginated reads of host-supplied SELECT queries.
//!
//! ## Pagination Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Page Read Contract                               │
//! │                                                                         │
//! │  read_page(query, offset, limit)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  <query> LIMIT ?1 OFFSET ?2      ← limit/offset are BOUND parameters   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<Record>  (materialized fully before returning)                    │
//! │                                                                         │
//! │  |page| == limit   → more rows may remain, read again                  │
//! │  |page| <  limit   → likely last page, but NOT proof of completion     │
//! │  |page| == 0       → authoritative end-of-table signal                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Value Decoding
//! SQLite storage classes map onto JSON scalars:
//! NULL → null, INTEGER → number, REAL → number, TEXT → string,
//! BLOB → lossy UTF-8 string.

use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use tracing::debug;

use crate::error::DbResult;
use relay_core::Record;

/// Reads bounded pages out of an arbitrary read-only SELECT.
#[derive(Debug, Clone)]
pub struct PageReader {
    pool: SqlitePool,

    /// Columns whose string values get the legacy re-wrap treatment.
    rewrap_columns: Vec<String>,
}

impl PageReader {
    /// Creates a new PageReader.
    pub fn new(pool: SqlitePool) -> Self {
        PageReader {
            pool,
            rewrap_columns: Vec::new(),
        }
    }

    /// Enables the legacy re-wrap quirk for the named columns.
    ///
    /// A string value `v` in a listed column is re-encoded as the literal
    /// text `{"v":v}` before it leaves the store. This reproduces the wire
    /// format the remote API historically expected for its progress-payload
    /// column. Opt-in per column; never applied by default.
    pub fn with_rewrap_columns(mut self, columns: Vec<String>) -> Self {
        self.rewrap_columns = columns;
        self
    }

    /// Reads one page of the given query.
    ///
    /// ## Arguments
    /// * `query` - Read-only SELECT statement (validated upstream)
    /// * `offset` - Row offset into the query's result set
    /// * `limit` - Maximum rows to return (the engine's batch size)
    ///
    /// ## Returns
    /// The page, fully materialized. An empty page means the table is
    /// exhausted at this offset; callers treat emptiness, not row count,
    /// as the end-of-table signal.
    pub async fn read_page(&self, query: &str, offset: u64, limit: usize) -> DbResult<Vec<Record>> {
        // Strip a trailing semicolon so the pagination clause parses
        let base = query.trim().trim_end_matches(';');
        let paginated = format!("{} LIMIT ?1 OFFSET ?2", base);

        let rows = sqlx::query(&paginated)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut page = Vec::with_capacity(rows.len());
        for row in &rows {
            page.push(self.row_to_record(row)?);
        }

        debug!(offset, rows = page.len(), "Read page");
        Ok(page)
    }

    /// Decodes one SQLite row into a Record.
    fn row_to_record(&self, row: &SqliteRow) -> DbResult<Record> {
        let mut record = Record::new();

        for (i, column) in row.columns().iter().enumerate() {
            let raw = row.try_get_raw(i)?;

            let value = if raw.is_null() {
                serde_json::Value::Null
            } else {
                // SqliteValueRef reports the runtime storage class, not the
                // declared column affinity
                match raw.type_info().name() {
                    "INTEGER" => serde_json::Value::from(row.try_get::<i64, _>(i)?),
                    "REAL" => {
                        let f: f64 = row.try_get(i)?;
                        serde_json::Number::from_f64(f)
                            .map(serde_json::Value::Number)
                            .unwrap_or(serde_json::Value::Null)
                    }
                    "BLOB" => {
                        let bytes: Vec<u8> = row.try_get(i)?;
                        serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
                    }
                    _ => serde_json::Value::String(row.try_get::<String, _>(i)?),
                }
            };

            let name = column.name().to_string();
            let value = self.maybe_rewrap(&name, value);
            record.insert(name, value);
        }

        Ok(record)
    }

    /// Applies the legacy re-wrap quirk to configured columns.
    fn maybe_rewrap(&self, column: &str, value: serde_json::Value) -> serde_json::Value {
        if !self.rewrap_columns.iter().any(|c| c == column) {
            return value;
        }

        match value {
            serde_json::Value::String(v) => {
                serde_json::Value::String(format!("{{\"{0}\":{0}}}", v))
            }
            other => other,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
