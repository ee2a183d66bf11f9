//! # Sync Runner
//!
//! One full pass over all configured tables, strictly in order.
//!
//! ## Isolation Guarantee
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   tables: [ A, B, C ]                                                   │
//! │                                                                         │
//! │   A sync ✓ ──► B sync ✗ ──► C sync ✓                                   │
//! │                                                                         │
//! │   B's failure never touches A or C. The report carries one             │
//! │   outcome per table; all_succeeded() is false iff any failed.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use relay_core::{Credentials, RunReport, TableConfig, TableOutcome};
use relay_db::Store;

use crate::client::RemoteClient;
use crate::config::SyncSettings;
use crate::orchestrator::TableOrchestrator;

/// Runs every configured table sequentially and aggregates the report.
pub struct SyncRunner<'a> {
    store: &'a Store,
    client: &'a RemoteClient,
    settings: &'a SyncSettings,
}

impl<'a> SyncRunner<'a> {
    /// Creates a runner over an open store.
    pub fn new(store: &'a Store, client: &'a RemoteClient, settings: &'a SyncSettings) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Executes one run: every table, in the order given.
    ///
    /// Tables the cancellation token preempts are recorded as failed so
    /// the report never silently drops a table.
    pub async fn run(
        &self,
        tables: &[TableConfig],
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> RunReport {
        let mut report = RunReport::begin();
        info!(
            run_id = %report.run_id,
            tables = tables.len(),
            batch_size = self.settings.batch_size,
            "Starting sync run"
        );

        let orchestrator = TableOrchestrator::new(self.store, self.client, self.settings);
        for table in tables {
            if cancel.is_cancelled() {
                warn!(run_id = %report.run_id, table = %table.name, "Run cancelled; table skipped");
                let mut outcome = TableOutcome::new(&table.name);
                outcome.failed = true;
                report.record(outcome);
                continue;
            }
            let outcome = orchestrator.sync_table(table, credentials, cancel).await;
            report.record(outcome);
        }

        report.finish();
        info!(
            run_id = %report.run_id,
            tables = report.outcomes.len(),
            rows_sent = report.total_rows_sent(),
            rows_written_back = report.total_rows_written_back(),
            failed_tables = ?report.failed_tables(),
            "Sync run finished"
        );
        report
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        credentials, echo_router, failing_router, seeded_store, spawn_server, table_for,
        RequestLog,
    };
    use std::time::Duration;

    fn test_client() -> RemoteClient {
        RemoteClient::new(Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_failed_table_does_not_stop_later_tables() {
        let store = seeded_store("alpha", 4).await;
        // Second and third source tables share the store.
        crate::testutil::seed_extra(&store, "beta", 4).await;
        crate::testutil::seed_extra(&store, "gamma", 4).await;

        let ok_log = RequestLog::new();
        let bad_log = RequestLog::new();
        let ok_addr = spawn_server(echo_router(ok_log.clone())).await;
        let bad_addr = spawn_server(failing_router(bad_log.clone())).await;

        let settings = SyncSettings::new().with_batch_size(10);
        let client = test_client();
        let runner = SyncRunner::new(&store, &client, &settings);

        let tables = vec![
            table_for("alpha", &ok_addr),
            table_for("beta", &bad_addr),
            table_for("gamma", &ok_addr),
        ];
        let report = runner
            .run(&tables, &credentials(), &CancellationToken::new())
            .await;

        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes[0].succeeded());
        assert!(report.outcomes[1].failed);
        assert!(report.outcomes[2].succeeded());
        assert!(!report.all_succeeded());
        assert_eq!(report.failed_tables(), vec!["beta"]);
        // The failing table was still fully attempted.
        assert_eq!(report.outcomes[1].rows_sent, 4);
        store.close().await;
    }

    #[tokio::test]
    async fn test_empty_table_list_succeeds() {
        let store = seeded_store("alpha", 0).await;
        let settings = SyncSettings::new();
        let client = test_client();
        let runner = SyncRunner::new(&store, &client, &settings);

        let report = runner
            .run(&[], &credentials(), &CancellationToken::new())
            .await;
        assert!(report.all_succeeded());
        assert!(report.outcomes.is_empty());
        assert_eq!(report.total_rows_sent(), 0);
        store.close().await;
    }

    #[tokio::test]
    async fn test_cancelled_run_records_skipped_tables_as_failed() {
        let store = seeded_store("alpha", 2).await;
        let log = RequestLog::new();
        let addr = spawn_server(echo_router(log.clone())).await;

        let settings = SyncSettings::new();
        let client = test_client();
        let runner = SyncRunner::new(&store, &client, &settings);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let tables = vec![table_for("alpha", &addr)];
        let report = runner.run(&tables, &credentials(), &cancel).await;

        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0].failed);
        assert_eq!(report.outcomes[0].rows_sent, 0);
        assert!(!report.all_succeeded());
        store.close().await;
    }
}
