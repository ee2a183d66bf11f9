//! # Store Pool Management
//!
//! Connection pool creation and configuration for the host application's
//! SQLite database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Connection Lifecycle                         │
//! │                                                                         │
//! │  Scheduled invocation begins                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(path) ← Configure pool settings                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::open(config).await ← Verify file exists + create pool          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐                                │                           │
//! │  │  │Conn1│  (max_connections = 1)         │                           │
//! │  │  └─────┘                                │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ table pass: read page → ... → upsert batch → next page         │
//! │       ▼                                                                 │
//! │  Store::close() ← Released before the invocation ends                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single Connection
//! A run is one linear sequence of reads and write-backs; a single pooled
//! connection serializes them and keeps the host database free for its
//! owner. The pool exists for lifecycle management, not concurrency.
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so shadow-table writes
//! don't block the host application's readers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::page::PageReader;
use crate::repository::shadow::ShadowWriter;

// =============================================================================
// Configuration
// =============================================================================

/// Local store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/data/app_database.db")
///     .acquire_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the host application's SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 1 (a run is strictly sequential)
    pub max_connections: u32,

    /// Timeout for acquiring a connection from the pool.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// SQLite busy timeout while the host app holds a write lock.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to create the database file if it doesn't exist.
    /// Default: false — the database belongs to the host application, and
    /// a missing file is a configuration error, not a reason to create an
    /// empty one.
    pub create_if_missing: bool,
}

impl StoreConfig {
    /// Creates a new store configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            create_if_missing: false,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets the SQLite busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to create the database file if missing.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Creates an in-memory store configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let store = Store::open(StoreConfig::in_memory()).await?;
    /// // Store is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            create_if_missing: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handle to the host application's SQLite database.
///
/// The only component allowed to hold a connection to the local store.
/// Opened at the start of a run, closed before the invocation ends.
#[derive(Debug, Clone)]
pub struct Store {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Store {
    /// Opens the local store.
    ///
    /// ## What This Does
    /// 1. Verifies the database file exists (unless `create_if_missing`)
    /// 2. Configures SQLite:
    ///    - WAL mode so writes don't block the host's readers
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - busy timeout for locks held by the host app
    /// 3. Creates the connection pool
    ///
    /// ## Returns
    /// * `Ok(Store)` - Ready-to-use store handle
    /// * `Err(DbError::DatabaseMissing)` - Configuration error, no retry
    /// * `Err(DbError::ConnectionFailed)` - Open failed
    pub async fn open(config: StoreConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening local store"
        );

        if !config.create_if_missing
            && !config.is_in_memory()
            && !config.database_path.exists()
        {
            return Err(DbError::DatabaseMissing(config.database_path));
        }

        // sqlite://path?mode=rwc creates the file if not exists,
        // mode=rw requires it to be present already
        let mode = if config.create_if_missing { "rwc" } else { "rw" };
        let connect_url = format!("sqlite://{}?mode={}", config.database_path.display(), mode);

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Local store pool created"
        );

        Ok(Store { pool })
    }

    /// Returns a reference to the connection pool.
    ///
    /// For queries not covered by the reader/writer. Prefer [`Store::pages`]
    /// and [`Store::shadow`] when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the paginated page reader.
    pub fn pages(&self) -> PageReader {
        PageReader::new(self.pool.clone())
    }

    /// Returns the shadow table writer.
    pub fn shadow(&self) -> ShadowWriter {
        ShadowWriter::new(self.pool.clone())
    }

    /// Closes the store connection pool.
    ///
    /// ## When To Call
    /// - At the end of every run (the engine does this)
    /// - On any unrecoverable error
    pub async fn close(&self) {
        info!("Closing local store pool");
        self.pool.close().await;
    }

    /// Checks if the store is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
