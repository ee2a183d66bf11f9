//! # Remote Client
//!
//! HTTP delivery of one page of records to the remote API.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One Page, One Round Trip                        │
//! │                                                                         │
//! │  POST <table.endpoint>                                                 │
//! │  Authorization: <credentials.authorization>                            │
//! │  X-Package-ID:  <credentials.package_id>                               │
//! │  Fingerprint:   <credentials.fingerprint>                              │
//! │  Device-Type:   <credentials.device_type>                              │
//! │  Version:       <credentials.version>                                  │
//! │  Content-Type:  application/json; charset=UTF-8                       │
//! │                                                                         │
//! │  {"table_name": "<remote_table_id>", "records": [ {...}, ... ]}        │
//! │                                                                         │
//! │  ◄── 2xx {"data": [ {...}, ... ]}   → success, write-back rows        │
//! │  ◄── 2xx {...}  (no data array)     → success, nothing to write back  │
//! │  ◄── non-2xx / timeout / bad JSON   → page failed                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Contract
//!
//! `send` never returns `Err`. Every transport-level problem collapses
//! into `RemoteResponse::failed()`, because a failed page is an expected
//! outcome the orchestrator handles, not a run-aborting condition.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, warn};

use relay_core::{Credentials, Record, RemoteResponse, TableConfig};

use crate::error::{SyncError, SyncResult};

/// Header carrying the application package identifier.
const HEADER_PACKAGE_ID: &str = "X-Package-ID";
/// Header carrying the device fingerprint.
const HEADER_FINGERPRINT: &str = "Fingerprint";
/// Header carrying the device type.
const HEADER_DEVICE_TYPE: &str = "Device-Type";
/// Header carrying the application version.
const HEADER_VERSION: &str = "Version";

/// Request body for one page delivery.
#[derive(Debug, Serialize)]
struct SyncPayload<'a> {
    table_name: &'a str,
    records: &'a [Record],
}

// =============================================================================
// Remote Client
// =============================================================================

/// HTTP client for page deliveries.
///
/// Cheap to clone (wraps a shared connection pool). One instance serves
/// all tables and all runs of an engine.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
}

impl RemoteClient {
    /// Builds a client with the given connect and request timeouts.
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| SyncError::ClientBuildFailed(e.to_string()))?;
        Ok(Self { http })
    }

    /// Delivers one page of records for one table.
    ///
    /// Infallible by design: every failure mode (connect refused,
    /// timeout, non-2xx status, unparseable body) becomes
    /// `RemoteResponse::failed()` and is logged here.
    pub async fn send(
        &self,
        records: &[Record],
        table: &TableConfig,
        credentials: &Credentials,
    ) -> RemoteResponse {
        let payload = SyncPayload {
            table_name: &table.remote_table_id,
            records,
        };

        let result = self
            .http
            .post(&table.endpoint)
            .header(AUTHORIZATION, &credentials.authorization)
            .header(HEADER_PACKAGE_ID, &credentials.package_id)
            .header(HEADER_FINGERPRINT, &credentials.fingerprint)
            .header(HEADER_DEVICE_TYPE, &credentials.device_type)
            .header(HEADER_VERSION, &credentials.version)
            // Set before .json() so reqwest keeps the charset variant.
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .json(&payload)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    table = %table.name,
                    endpoint = %table.endpoint,
                    error = %e,
                    "Page delivery failed at transport level"
                );
                return RemoteResponse::failed();
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                table = %table.name,
                status = %status,
                body = %truncate_for_log(&body),
                "Remote API rejected page"
            );
            return RemoteResponse::failed();
        }

        let body: serde_json::Value = match response.json().await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    table = %table.name,
                    status = %status,
                    error = %e,
                    "Remote API returned unparseable body"
                );
                return RemoteResponse::failed();
            }
        };

        debug!(
            table = %table.name,
            records = records.len(),
            status = %status,
            "Page delivered"
        );
        parse_response_body(body)
    }
}

/// Maps a parsed 2xx response body onto the `RemoteResponse` contract.
///
/// A `data` array means success with write-back rows (non-object
/// elements are skipped); any other shape is an acknowledgement with
/// nothing to write back.
fn parse_response_body(body: serde_json::Value) -> RemoteResponse {
    match body.get("data").and_then(|d| d.as_array()) {
        Some(rows) => {
            let records: Vec<Record> = rows
                .iter()
                .filter_map(|row| row.as_object().cloned())
                .collect();
            RemoteResponse::ok(records)
        }
        None => RemoteResponse::accepted(),
    }
}

/// Caps response bodies quoted in log lines.
fn truncate_for_log(body: &str) -> &str {
    let limit = 256;
    match body.char_indices().nth(limit) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(1));
        record.insert("lesson".to_string(), json!("intro"));
        let payload = SyncPayload {
            table_name: "user_progress",
            records: std::slice::from_ref(&record),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["table_name"], "user_progress");
        assert_eq!(value["records"][0]["id"], 1);
        assert_eq!(value["records"][0]["lesson"], "intro");
    }

    #[test]
    fn test_data_array_becomes_records() {
        let body = json!({"data": [{"id": 1}, {"id": 2}]});
        let response = parse_response_body(body);
        assert!(response.success);
        assert!(response.has_records());
        assert_eq!(response.records.unwrap().len(), 2);
    }

    #[test]
    fn test_missing_data_is_plain_acknowledgement() {
        let response = parse_response_body(json!({"status": "ok"}));
        assert!(response.success);
        assert!(!response.has_records());
    }

    #[test]
    fn test_non_array_data_is_plain_acknowledgement() {
        let response = parse_response_body(json!({"data": {"count": 3}}));
        assert!(response.success);
        assert!(!response.has_records());
    }

    #[test]
    fn test_non_object_rows_are_skipped() {
        let body = json!({"data": [{"id": 1}, 42, "junk", {"id": 2}]});
        let response = parse_response_body(body);
        assert_eq!(response.records.unwrap().len(), 2);
    }

    #[test]
    fn test_empty_data_array_is_success_with_no_rows() {
        let response = parse_response_body(json!({"data": []}));
        assert!(response.success);
        assert!(!response.has_records());
    }

    #[test]
    fn test_truncate_for_log() {
        let short = "hello";
        assert_eq!(truncate_for_log(short), "hello");
        let long = "x".repeat(1000);
        assert_eq!(truncate_for_log(&long).len(), 256);
    }
}
