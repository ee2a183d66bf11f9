//! # Table Orchestrator
//!
//! Runs the paginate → send → write-back loop for one table.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Table, One Pass                                │
//! │                                                                         │
//! │        ┌──────────┐  page    ┌──────────┐  response  ┌──────────────┐  │
//! │   ┌───►│ READING  │─────────►│ SENDING  │───────────►│ WRITING_BACK │  │
//! │   │    └────┬─────┘          └──────────┘            └──────┬───────┘  │
//! │   │         │ empty page                                    │          │
//! │   │         ▼                                               │          │
//! │   │    ┌──────────┐                                         │          │
//! │   │    │   DONE   │                                         │          │
//! │   │    └──────────┘                                         │          │
//! │   └─────────────────────────────────────────────────────────┘          │
//! │                                                                         │
//! │  • Cursor starts at 0 and advances by the page length after each       │
//! │    read, even when the send fails (skip-and-continue).                 │
//! │  • A short page does NOT terminate the table; only an empty read       │
//! │    does. Exactly ⌈N/B⌉ + 1 reads for N rows at page size B.           │
//! │  • A local read error is fatal for the table, never for the run.      │
//! │  • Cancellation is honored between pages, never mid-page.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use relay_core::{Credentials, Record, RemoteResponse, TableConfig, TableOutcome};
use relay_db::Store;

use crate::client::RemoteClient;
use crate::config::SyncSettings;

/// Phases of a single table pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Reading,
    Sending,
    WritingBack,
    Done,
}

// =============================================================================
// Table Orchestrator
// =============================================================================

/// Drives one table through the full READING → SENDING → WRITING_BACK
/// cycle until the source is exhausted.
///
/// Borrows the store and client; a new orchestrator is built per run,
/// the underlying connections are shared.
pub struct TableOrchestrator<'a> {
    store: &'a Store,
    client: &'a RemoteClient,
    settings: &'a SyncSettings,
}

impl<'a> TableOrchestrator<'a> {
    /// Creates an orchestrator over an open store.
    pub fn new(store: &'a Store, client: &'a RemoteClient, settings: &'a SyncSettings) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Synchronizes one table end to end.
    ///
    /// Never fails the caller: every problem is folded into the returned
    /// `TableOutcome` so sibling tables keep running.
    pub async fn sync_table(
        &self,
        table: &TableConfig,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> TableOutcome {
        let mut outcome = TableOutcome::new(&table.name);
        let reader = self
            .store
            .pages()
            .with_rewrap_columns(self.settings.rewrap_columns.clone());
        let writer = self.store.shadow();

        let mut cursor: u64 = 0;
        let mut page: Vec<Record> = Vec::new();
        let mut response = RemoteResponse::accepted();
        let mut phase = Phase::Reading;

        debug!(
            table = %table.name,
            batch_size = self.settings.batch_size,
            "Starting table pass"
        );

        loop {
            trace!(table = %table.name, ?phase, cursor, "Phase transition");
            match phase {
                Phase::Reading => {
                    if cancel.is_cancelled() {
                        info!(table = %table.name, cursor, "Cancelled between pages");
                        outcome.failed = true;
                        phase = Phase::Done;
                        continue;
                    }
                    match reader
                        .read_page(&table.select_query, cursor, self.settings.batch_size)
                        .await
                    {
                        Ok(rows) if rows.is_empty() => {
                            phase = Phase::Done;
                        }
                        Ok(rows) => {
                            cursor += rows.len() as u64;
                            page = rows;
                            phase = Phase::Sending;
                        }
                        Err(e) => {
                            error!(
                                table = %table.name,
                                cursor,
                                error = %e,
                                "Page read failed; abandoning table"
                            );
                            outcome.failed = true;
                            phase = Phase::Done;
                        }
                    }
                }
                Phase::Sending => {
                    response = self.client.send(&page, table, credentials).await;
                    outcome.rows_sent += page.len() as u64;
                    if !response.success {
                        // Cursor already advanced: later pages still go out.
                        warn!(
                            table = %table.name,
                            cursor,
                            page_len = page.len(),
                            "Page delivery failed; continuing with next page"
                        );
                        outcome.failed = true;
                    }
                    phase = Phase::WritingBack;
                }
                Phase::WritingBack => {
                    if response.success && response.has_records() {
                        let records = response.records.take().unwrap_or_default();
                        match writer.upsert(&table.shadow_table, &records).await {
                            Ok(written) => {
                                outcome.rows_written_back += written;
                            }
                            Err(e) => {
                                error!(
                                    table = %table.name,
                                    shadow_table = %table.shadow_table,
                                    error = %e,
                                    "Shadow write-back failed"
                                );
                                outcome.failed = true;
                            }
                        }
                    }
                    phase = Phase::Reading;
                }
                Phase::Done => break,
            }
        }

        info!(
            table = %table.name,
            rows_sent = outcome.rows_sent,
            rows_written_back = outcome.rows_written_back,
            failed = outcome.failed,
            "Table pass finished"
        );
        outcome
    }
}

// =============================================================================
// Tests
// =============================================================================
