//! # Seed Data Generator
//!
//! Creates a demo database with a source table and its shadow twin, for
//! manual end-to-end runs of the sync engine.
//!
//! ## Usage
//! ```bash
//! # Generate 12,000 rows (default)
//! cargo run -p relay-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p relay-db --bin seed -- --rows 50000
//!
//! # Specify database path
//! cargo run -p relay-db --bin seed -- --db ./data/app_database.db
//! ```
//!
//! ## Generated Schema
//! - `progress`       - id, lesson, progress_data, score, updated_at
//! - `progress_copy`  - same columns; receives write-back data

use std::env;

use relay_db::{Store, StoreConfig};

/// Lesson names for realistic test rows
const LESSONS: &[&str] = &[
    "intro",
    "vocabulary",
    "grammar-1",
    "grammar-2",
    "listening",
    "speaking",
    "reading",
    "writing",
    "review",
    "exam-prep",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut rows: usize = 12_000;
    let mut db_path = String::from("./relay_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rows" | "-r" => {
                if i + 1 < args.len() {
                    rows = args[i + 1].parse().unwrap_or(12_000);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Relay Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -r, --rows <N>     Number of rows to generate (default: 12000)");
                println!("  -d, --db <PATH>    Database file path (default: ./relay_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Relay Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Rows:     {}", rows);
    println!();

    let store = Store::open(StoreConfig::new(&db_path).create_if_missing(true)).await?;
    println!("✓ Opened database");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS progress (
            id INTEGER PRIMARY KEY,
            lesson TEXT NOT NULL,
            progress_data TEXT,
            score REAL,
            updated_at TEXT
        )",
    )
    .execute(store.pool())
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS progress_copy (
            id INTEGER PRIMARY KEY,
            lesson TEXT NOT NULL,
            progress_data TEXT,
            score REAL,
            updated_at TEXT
        )",
    )
    .execute(store.pool())
    .await?;

    println!("✓ Created progress + progress_copy tables");

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress")
        .fetch_one(store.pool())
        .await?;
    if existing > 0 {
        println!("⚠ Database already has {} rows", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating rows...");

    let start = std::time::Instant::now();
    let mut inserted = 0usize;

    // One transaction per chunk, mirroring the engine's batch writes
    for chunk_start in (0..rows).step_by(1000) {
        let chunk_end = (chunk_start + 1000).min(rows);

        let mut tx = store.pool().begin().await?;
        for n in chunk_start..chunk_end {
            let lesson = LESSONS[n % LESSONS.len()];
            let payload = format!("lesson_{}_step_{}", lesson, n % 40);
            let score = (n % 101) as f64 / 100.0;

            sqlx::query(
                "INSERT INTO progress (id, lesson, progress_data, score, updated_at)
                 VALUES (?1, ?2, ?3, ?4, datetime('now'))",
            )
            .bind((n + 1) as i64)
            .bind(lesson)
            .bind(payload)
            .bind(score)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        inserted = chunk_end;
        if inserted % 5000 == 0 {
            println!("  Generated {} rows...", inserted);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} rows in {:?}", inserted, elapsed);
    println!(
        "  Rate: {:.0} rows/second",
        inserted as f64 / elapsed.as_secs_f64()
    );

    store.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
