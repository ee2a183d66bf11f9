//! # Relay Sync Engine
//!
//! Drives the full synchronization pass: paginate local tables, deliver
//! each page to the remote API, and write returned rows back into shadow
//! tables. Pages move strictly in cursor order with exactly one page in
//! flight per table.
//!
//! ## Module Structure
//!
//! ```text
//! relay-sync
//! ├── config        - SyncSettings (knobs) and SyncRequest (per-run input)
//! ├── client        - RemoteClient: one page, one HTTP round trip
//! ├── orchestrator  - TableOrchestrator: READING → SENDING → WRITING_BACK
//! ├── runner        - SyncRunner: sequential tables, RunReport aggregation
//! ├── schedule      - ScheduleController: bounded whole-run retry
//! ├── engine        - SyncEngine: public entry point
//! └── error         - SyncError taxonomy
//! ```
//!
//! ## Failure Philosophy
//!
//! - A failed page send marks the table failed but the cursor keeps
//!   advancing; later pages still go out (skip-and-continue).
//! - A failed table never stops the run; remaining tables still sync.
//! - A failed run may be retried as a whole, a bounded number of times.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod runner;
pub mod schedule;

#[cfg(test)]
mod testutil;

pub use client::RemoteClient;
pub use config::{SyncRequest, SyncSettings};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use orchestrator::TableOrchestrator;
pub use runner::SyncRunner;
pub use schedule::{RetryPolicy, ScheduleController, ScheduleOutcome};
