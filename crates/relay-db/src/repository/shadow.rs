//! # Shadow Writer
//!
//! Transactional insert-or-replace into shadow tables.
//!
//! ## Write-Back Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Shadow Upsert Contract                              │
//! │                                                                         │
//! │  upsert(shadow_table, records)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  INSERT OR REPLACE INTO <shadow> (col, ...) VALUES (?, ...)    │   │
//! │  │  INSERT OR REPLACE INTO <shadow> (col, ...) VALUES (?, ...)    │   │
//! │  │  ...one statement per record, values always bound...           │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← all records land, or (on any failure) NONE do                │
//! │                                                                         │
//! │  KEY GUARANTEES:                                                       │
//! │  • Idempotent: re-applying the same records leaves the table as-is     │
//! │  • Atomic per batch: a failure on record 3 of 5 commits nothing        │
//! │  • Errors surface to the caller; nothing is silently swallowed         │
//! │  • Identifiers validated, values bound: no SQL built from data         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use relay_core::validation::validate_identifier;
use relay_core::Record;

/// Writes remote-response records into a shadow table.
#[derive(Debug, Clone)]
pub struct ShadowWriter {
    pool: SqlitePool,
}

impl ShadowWriter {
    /// Creates a new ShadowWriter.
    pub fn new(pool: SqlitePool) -> Self {
        ShadowWriter { pool }
    }

    /// Upserts a batch of records into `shadow_table`.
    ///
    /// ## Arguments
    /// * `shadow_table` - Target table; keyed on its natural primary key
    /// * `records` - Rows from the remote response
    ///
    /// ## Returns
    /// Number of rows written. Zero for an empty batch (no transaction is
    /// opened). On any failure the whole batch is rolled back and the
    /// error is returned.
    pub async fn upsert(&self, shadow_table: &str, records: &[Record]) -> DbResult<u64> {
        // An empty record has no columns to name, so no valid INSERT
        // exists for it. Skip rather than fail the batch.
        let rows: Vec<&Record> = records.iter().filter(|r| !r.is_empty()).collect();
        let skipped = records.len() - rows.len();
        if skipped > 0 {
            debug!(
                table = %shadow_table,
                skipped,
                "Skipping empty records in write-back batch"
            );
        }
        if rows.is_empty() {
            return Ok(0);
        }

        validate_identifier(shadow_table)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for record in &rows {
            let statement = insert_statement(shadow_table, record)?;

            let mut query = sqlx::query(&statement);
            for value in record.values() {
                query = bind_value(query, value);
            }

            query.execute(&mut *tx).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(
            table = %shadow_table,
            rows = rows.len(),
            "Upserted write-back batch"
        );

        Ok(rows.len() as u64)
    }
}

/// Builds the INSERT OR REPLACE statement for one record.
///
/// Column names come from the record's keys and are validated; values are
/// always placeholders.
fn insert_statement(shadow_table: &str, record: &Record) -> DbResult<String> {
    let mut columns = Vec::with_capacity(record.len());
    for name in record.keys() {
        columns.push(validate_identifier(name)?);
    }

    let placeholders: Vec<&str> = std::iter::repeat("?").take(columns.len()).collect();

    Ok(format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        shadow_table,
        columns.join(", "),
        placeholders.join(", ")
    ))
}

/// Binds one JSON scalar as a typed SQLite parameter.
fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    value: &'q serde_json::Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match value {
        serde_json::Value::Null => query.bind(None::<String>),
        serde_json::Value::Bool(b) => query.bind(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else {
                query.bind(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => query.bind(s.as_str()),
        // Nested arrays/objects are stored as their JSON text
        other => query.bind(other.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    async fn shadow_store() -> Store {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        sqlx::query(
            "CREATE TABLE progress_copy (
                id INTEGER PRIMARY KEY,
                label TEXT NOT NULL,
                score REAL
            )",
        )
        .execute(store.pool())
        .await
        .unwrap();

        store
    }

    fn record(id: i64, label: Option<&str>, score: f64) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), serde_json::json!(id));
        r.insert(
            "label".into(),
            label.map_or(serde_json::Value::Null, |l| serde_json::json!(l)),
        );
        r.insert("score".into(), serde_json::json!(score));
        r
    }

    async fn count(store: &Store) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM progress_copy")
            .fetch_one(store.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_writes_batch() {
        let store = shadow_store().await;
        let records = vec![record(1, Some("a"), 0.5), record(2, Some("b"), 1.0)];

        let written = store.shadow().upsert("progress_copy", &records).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(count(&store).await, 2);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = shadow_store().await;
        let records = vec![record(1, Some("a"), 0.5), record(2, Some("b"), 1.0)];
        let writer = store.shadow();

        writer.upsert("progress_copy", &records).await.unwrap();
        writer.upsert("progress_copy", &records).await.unwrap();

        assert_eq!(count(&store).await, 2);

        let label: String =
            sqlx::query_scalar("SELECT label FROM progress_copy WHERE id = 1")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(label, "a");
    }

    #[tokio::test]
    async fn test_replace_overwrites_by_primary_key() {
        let store = shadow_store().await;
        let writer = store.shadow();

        writer
            .upsert("progress_copy", &[record(1, Some("old"), 0.0)])
            .await
            .unwrap();
        writer
            .upsert("progress_copy", &[record(1, Some("new"), 9.0)])
            .await
            .unwrap();

        assert_eq!(count(&store).await, 1);
        let label: String =
            sqlx::query_scalar("SELECT label FROM progress_copy WHERE id = 1")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(label, "new");
    }

    #[tokio::test]
    async fn test_failed_batch_commits_nothing() {
        let store = shadow_store().await;

        // Record 3 of 5 violates the NOT NULL constraint on label
        let records = vec![
            record(1, Some("a"), 0.1),
            record(2, Some("b"), 0.2),
            record(3, None, 0.3),
            record(4, Some("d"), 0.4),
            record(5, Some("e"), 0.5),
        ];

        let result = store.shadow().upsert("progress_copy", &records).await;
        assert!(result.is_err());
        assert_eq!(count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let store = shadow_store().await;
        let written = store.shadow().upsert("progress_copy", &[]).await.unwrap();
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_empty_records_are_skipped_not_fatal() {
        let store = shadow_store().await;

        // A remote response can carry `{}` rows; they have no columns to
        // insert and must not sink the rest of the batch.
        let records = vec![
            record(1, Some("a"), 0.1),
            Record::new(),
            record(2, Some("b"), 0.2),
        ];

        let written = store.shadow().upsert("progress_copy", &records).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(count(&store).await, 2);
    }

    #[tokio::test]
    async fn test_all_empty_batch_writes_nothing() {
        let store = shadow_store().await;
        let records = vec![Record::new(), Record::new()];

        let written = store.shadow().upsert("progress_copy", &records).await.unwrap();
        assert_eq!(written, 0);
        assert_eq!(count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_rejects_unsafe_identifiers() {
        let store = shadow_store().await;

        let result = store
            .shadow()
            .upsert("copy; DROP TABLE progress_copy", &[record(1, Some("a"), 0.0)])
            .await;
        assert!(matches!(result, Err(DbError::Validation(_))));

        let mut bad_column = Record::new();
        bad_column.insert("id\" (id) VALUES (1); --".into(), serde_json::json!(1));
        let result = store.shadow().upsert("progress_copy", &[bad_column]).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
    }
}
