//! # Sync Engine
//!
//! Public entry point. Owns the settings and the HTTP client; opens the
//! local store fresh for every run and closes it when the run ends.
//!
//! ## Run Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  start_sync(request)                                                    │
//! │                                                                         │
//! │  1. validate request        (config error? abort, never retry)         │
//! │  2. open store              (missing file? config error)               │
//! │  3. SyncRunner::run         (never fails; report carries outcomes)     │
//! │  4. close store                                                        │
//! │  5. return RunReport                                                   │
//! │                                                                         │
//! │  start_sync_with_retry wraps the above in a ScheduleController:        │
//! │  a dirty report triggers another full run, up to max_retries, with     │
//! │  a fixed delay in between.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use relay_core::{Credentials, TableConfig};
//! use relay_sync::{SyncEngine, SyncRequest, SyncSettings};
//!
//! # async fn demo() -> relay_sync::SyncResult<()> {
//! let engine = SyncEngine::new(SyncSettings::default())?;
//! let request = SyncRequest::new(
//!     "/var/lib/relay/app.db",
//!     vec![TableConfig::new(
//!         "progress",
//!         "progress_copy",
//!         "SELECT * FROM progress",
//!         "user_progress",
//!         "https://api.example.com/sync",
//!     )],
//!     Credentials {
//!         fingerprint: "device-fp".into(),
//!         authorization: "Bearer token".into(),
//!         package_id: "com.example.app".into(),
//!         device_type: "desktop".into(),
//!         version: "1.0.0".into(),
//!     },
//! );
//! let report = engine.start_sync(&request).await?;
//! println!("sent {} rows", report.total_rows_sent());
//! # Ok(())
//! # }
//! ```

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use relay_core::RunReport;
use relay_db::{Store, StoreConfig};

use crate::client::RemoteClient;
use crate::config::{SyncRequest, SyncSettings};
use crate::error::SyncResult;
use crate::runner::SyncRunner;
use crate::schedule::{RetryPolicy, ScheduleController, ScheduleOutcome};

// =============================================================================
// Sync Engine
// =============================================================================

/// The engine a host application holds for the lifetime of the process.
///
/// Stateless between runs: everything a run needs arrives in the
/// `SyncRequest`, and the store is opened and closed per run.
pub struct SyncEngine {
    settings: SyncSettings,
    client: RemoteClient,
}

impl SyncEngine {
    /// Builds an engine, validating the settings up front.
    pub fn new(settings: SyncSettings) -> SyncResult<Self> {
        settings.validate()?;
        let client = RemoteClient::new(settings.connect_timeout, settings.request_timeout)?;
        debug!(
            batch_size = settings.batch_size,
            max_retries = settings.max_retries,
            "Sync engine ready"
        );
        Ok(Self { settings, client })
    }

    /// The settings this engine was built with.
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Runs one sync pass over every table in the request.
    pub async fn start_sync(&self, request: &SyncRequest) -> SyncResult<RunReport> {
        self.start_sync_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Runs one sync pass, honoring cancellation between pages.
    pub async fn start_sync_with_cancel(
        &self,
        request: &SyncRequest,
        cancel: &CancellationToken,
    ) -> SyncResult<RunReport> {
        request.validate()?;

        // The database belongs to the host application; the engine never
        // creates it. A single connection keeps reads and write-backs on
        // one serialized handle.
        let store = Store::open(
            StoreConfig::new(&request.database_path)
                .max_connections(1)
                .create_if_missing(false),
        )
        .await?;

        let runner = SyncRunner::new(&store, &self.client, &self.settings);
        let report = runner.run(&request.tables, &request.credentials, cancel).await;
        store.close().await;

        info!(
            run_id = %report.run_id,
            all_succeeded = report.all_succeeded(),
            "Run complete"
        );
        Ok(report)
    }

    /// Runs with the bounded retry policy: a run that leaves failed
    /// tables is re-attempted from scratch, up to `max_retries` total
    /// attempts with a fixed delay in between, then the controller
    /// gives up for good.
    pub async fn start_sync_with_retry(
        &self,
        request: &SyncRequest,
    ) -> SyncResult<ScheduleOutcome> {
        let controller = ScheduleController::new(RetryPolicy {
            max_attempts: self.settings.max_retries,
            retry_delay: self.settings.retry_delay,
        });
        controller.run(|| self.start_sync(request)).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::testutil::{
        credentials, echo_router, failing_router, flaky_router, seeded_db_file, spawn_server,
        table_for, RequestLog,
    };
    use std::time::Duration;

    fn fast_settings(batch_size: usize) -> SyncSettings {
        SyncSettings::new()
            .with_batch_size(batch_size)
            .with_retry_delay(Duration::from_millis(10))
            .with_connect_timeout(Duration::from_secs(5))
            .with_request_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_end_to_end_sync_with_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("relay.db");
        seeded_db_file(&db_path, "progress", 12).await;

        let log = RequestLog::new();
        let addr = spawn_server(echo_router(log.clone())).await;

        let engine = SyncEngine::new(fast_settings(5)).unwrap();
        let request = SyncRequest::new(&db_path, vec![table_for("progress", &addr)], credentials());
        let report = engine.start_sync(&request).await.unwrap();

        assert!(report.all_succeeded());
        assert_eq!(report.total_rows_sent(), 12);
        assert_eq!(report.total_rows_written_back(), 12);
        // 12 rows at page size 5: pages of 5, 5, 2.
        assert_eq!(log.bodies().len(), 3);

        // Write-back is durable after the engine closed the store.
        let verify = relay_db::Store::open(relay_db::StoreConfig::new(&db_path))
            .await
            .unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress_copy")
            .fetch_one(verify.pool())
            .await
            .unwrap();
        assert_eq!(count, 12);
        verify.close().await;
    }

    #[tokio::test]
    async fn test_missing_database_is_immediate_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("never_created.db");

        let log = RequestLog::new();
        let addr = spawn_server(echo_router(log.clone())).await;

        let engine = SyncEngine::new(fast_settings(5)).unwrap();
        let request = SyncRequest::new(&db_path, vec![table_for("progress", &addr)], credentials());
        let err = engine.start_sync(&request).await.unwrap_err();

        assert!(err.is_config_error());
        assert!(log.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_any_io() {
        let engine = SyncEngine::new(fast_settings(5)).unwrap();
        let mut table = table_for("progress", "http://127.0.0.1:1");
        table.shadow_table = "copy; DROP TABLE progress".to_string();
        let request = SyncRequest::new("/tmp/whatever.db", vec![table], credentials());

        let err = engine.start_sync(&request).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("relay.db");
        seeded_db_file(&db_path, "progress", 2).await;

        let log = RequestLog::new();
        let addr = spawn_server(failing_router(log.clone())).await;

        let settings = fast_settings(10).with_max_retries(5);
        let engine = SyncEngine::new(settings).unwrap();
        let request = SyncRequest::new(&db_path, vec![table_for("progress", &addr)], credentials());
        let outcome = engine.start_sync_with_retry(&request).await.unwrap();

        assert!(!outcome.is_completed());
        assert_eq!(outcome.attempts(), 5);
        // One page per run, five runs, no sixth delivery.
        assert_eq!(log.bodies().len(), 5);
    }

    #[tokio::test]
    async fn test_retry_recovers_when_remote_comes_back() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("relay.db");
        seeded_db_file(&db_path, "progress", 2).await;

        let log = RequestLog::new();
        // First two deliveries fail, third succeeds.
        let addr = spawn_server(flaky_router(log.clone(), 2)).await;

        let settings = fast_settings(10).with_max_retries(5);
        let engine = SyncEngine::new(settings).unwrap();
        let request = SyncRequest::new(&db_path, vec![table_for("progress", &addr)], credentials());
        let outcome = engine.start_sync_with_retry(&request).await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.attempts(), 3);
        assert!(outcome.report().all_succeeded());
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected_at_construction() {
        let result = SyncEngine::new(SyncSettings::new().with_batch_size(0));
        assert!(matches!(result, Err(SyncError::InvalidConfig(_))));
    }
}
