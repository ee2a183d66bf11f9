//! # Schedule Controller
//!
//! Bounded whole-run retry with a fixed delay.
//!
//! ## Retry Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   attempt 1 ──fail──► sleep(delay) ──► attempt 2 ──fail──► ...         │
//! │                                                                         │
//! │   • A clean run (all tables succeeded) stops immediately: Completed.   │
//! │   • After max_attempts failed runs the controller gives up: GaveUp.    │
//! │     Nothing reschedules after that; the host decides what happens      │
//! │     next.                                                              │
//! │   • Configuration errors abort at once. Retrying a bad table name     │
//! │     or a missing database file cannot succeed.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use relay_core::RunReport;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Retry Policy
// =============================================================================

/// How many times to attempt a run, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be at least 1.
    pub max_attempts: u32,

    /// Fixed delay between consecutive attempts.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: relay_core::DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(relay_core::DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

// =============================================================================
// Schedule Outcome
// =============================================================================

/// Terminal state of a retried run.
#[derive(Debug)]
pub enum ScheduleOutcome {
    /// A run came back fully clean.
    Completed { attempts: u32, report: RunReport },

    /// Every attempt left at least one table failed. Carries the last
    /// report so the host can inspect which tables kept failing.
    GaveUp { attempts: u32, report: RunReport },
}

impl ScheduleOutcome {
    /// The report from the final attempt.
    pub fn report(&self) -> &RunReport {
        match self {
            ScheduleOutcome::Completed { report, .. } => report,
            ScheduleOutcome::GaveUp { report, .. } => report,
        }
    }

    /// Number of attempts actually made.
    pub fn attempts(&self) -> u32 {
        match self {
            ScheduleOutcome::Completed { attempts, .. } => *attempts,
            ScheduleOutcome::GaveUp { attempts, .. } => *attempts,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ScheduleOutcome::Completed { .. })
    }
}

// =============================================================================
// Schedule Controller
// =============================================================================

/// Drives run attempts under a `RetryPolicy`.
///
/// Generic over the attempt closure so the policy is testable without
/// a store or a network.
pub struct ScheduleController {
    policy: RetryPolicy,
}

impl ScheduleController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Runs `attempt_fn` until a run succeeds or attempts are exhausted.
    ///
    /// Returns `Err` only for conditions where another attempt is
    /// pointless: configuration errors immediately, or a hard error on
    /// every single attempt.
    pub async fn run<F, Fut>(&self, mut attempt_fn: F) -> SyncResult<ScheduleOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SyncResult<RunReport>>,
    {
        let max = self.policy.max_attempts.max(1);
        let mut last_report: Option<RunReport> = None;
        let mut last_error: Option<SyncError> = None;

        for attempt in 1..=max {
            match attempt_fn().await {
                Ok(report) if report.all_succeeded() => {
                    info!(attempt, "Sync run completed cleanly");
                    return Ok(ScheduleOutcome::Completed {
                        attempts: attempt,
                        report,
                    });
                }
                Ok(report) => {
                    warn!(
                        attempt,
                        max_attempts = max,
                        failed_tables = ?report.failed_tables(),
                        "Sync run left failed tables"
                    );
                    last_report = Some(report);
                    last_error = None;
                }
                Err(e) if e.is_config_error() => {
                    warn!(attempt, error = %e, "Configuration error; not retrying");
                    return Err(e);
                }
                Err(e) => {
                    warn!(attempt, max_attempts = max, error = %e, "Sync run errored");
                    last_error = Some(e);
                }
            }

            if attempt < max {
                sleep(self.policy.retry_delay).await;
            }
        }

        match (last_report, last_error) {
            (Some(report), _) => Ok(ScheduleOutcome::GaveUp {
                attempts: max,
                report,
            }),
            (None, Some(error)) => Err(error),
            (None, None) => Err(SyncError::Internal(
                "retry loop made no attempts".to_string(),
            )),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
