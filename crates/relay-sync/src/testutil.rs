//! Shared helpers for relay-sync tests: an in-process HTTP endpoint
//! standing in for the remote API, plus pre-seeded local stores.

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use relay_core::{Credentials, TableConfig};
use relay_db::{Store, StoreConfig};

/// Captures every request body the test server sees, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, body: Value) {
        self.bodies.lock().unwrap().push(body);
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }
}

/// Router that acknowledges every page and echoes the records back in
/// the `data` array, so write-back paths get exercised.
pub fn echo_router(log: RequestLog) -> Router {
    Router::new().route(
        "/sync",
        post(move |Json(body): Json<Value>| {
            let log = log.clone();
            async move {
                let records = body["records"].clone();
                log.push(body);
                Json(json!({ "data": records }))
            }
        }),
    )
}

/// Router that rejects every page with a 500.
pub fn failing_router(log: RequestLog) -> Router {
    Router::new().route(
        "/sync",
        post(move |Json(body): Json<Value>| {
            let log = log.clone();
            async move {
                log.push(body);
                (StatusCode::INTERNAL_SERVER_ERROR, "remote unavailable")
            }
        }),
    )
}

/// Router that fails the first `fail_first` requests, then echoes.
pub fn flaky_router(log: RequestLog, fail_first: usize) -> Router {
    Router::new().route(
        "/sync",
        post(move |Json(body): Json<Value>| {
            let log = log.clone();
            async move {
                let records = body["records"].clone();
                log.push(body);
                if log.len() <= fail_first {
                    Err((StatusCode::INTERNAL_SERVER_ERROR, "warming up"))
                } else {
                    Ok(Json(json!({ "data": records })))
                }
            }
        }),
    )
}

/// Binds the router on an ephemeral port and returns the base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Test credentials accepted by the in-process server.
pub fn credentials() -> Credentials {
    Credentials {
        fingerprint: "test-fingerprint".to_string(),
        authorization: "Bearer test-token".to_string(),
        package_id: "com.relay.test".to_string(),
        device_type: "desktop".to_string(),
        version: "0.1.0".to_string(),
    }
}

/// Table config pointing a local table at the test server's /sync route.
pub fn table_for(name: &str, base_url: &str) -> TableConfig {
    TableConfig::new(
        name,
        format!("{name}_copy"),
        format!("SELECT * FROM {name} ORDER BY id"),
        format!("remote_{name}"),
        format!("{base_url}/sync"),
    )
}

/// In-memory store with a seeded source table and its empty shadow.
pub async fn seeded_store(table: &str, rows: usize) -> Store {
    let store = Store::open(StoreConfig::in_memory()).await.unwrap();
    seed_tables(&store, table, rows).await;
    store
}

/// File-backed store for engine tests (the engine requires an existing
/// database file). Creates, seeds, and closes it.
pub async fn seeded_db_file(path: &Path, table: &str, rows: usize) {
    let store = Store::open(StoreConfig::new(path).create_if_missing(true))
        .await
        .unwrap();
    seed_tables(&store, table, rows).await;
    store.close().await;
}

/// Seeds an additional source/shadow table pair in an existing store.
pub async fn seed_extra(store: &Store, table: &str, rows: usize) {
    seed_tables(store, table, rows).await;
}

async fn seed_tables(store: &Store, table: &str, rows: usize) {
    sqlx::query(&format!(
        "CREATE TABLE {table} (id INTEGER PRIMARY KEY, lesson TEXT NOT NULL, score INTEGER)"
    ))
    .execute(store.pool())
    .await
    .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE {table}_copy (id INTEGER PRIMARY KEY, lesson TEXT NOT NULL, score INTEGER)"
    ))
    .execute(store.pool())
    .await
    .unwrap();

    for i in 1..=rows {
        sqlx::query(&format!(
            "INSERT INTO {table} (id, lesson, score) VALUES (?1, ?2, ?3)"
        ))
        .bind(i as i64)
        .bind(format!("lesson-{i}"))
        .bind((i * 10) as i64)
        .execute(store.pool())
        .await
        .unwrap();
    }
}
