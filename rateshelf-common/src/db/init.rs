//! Database initialization
//!
//! Opens (creating if needed) the SQLite store and makes sure both tables
//! and their indexes exist. Safe to run on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Open the store named by `database_url` and create missing tables
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    if is_memory_url(database_url) {
        return init_memory_database().await;
    }

    // Create parent directory if it doesn't exist
    if let Some(path) = file_path_of(database_url) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    info!("Opened database: {}", database_url);

    create_tables(&pool).await?;
    Ok(pool)
}

/// Open a private in-memory store with the full schema
///
/// The pool is pinned to one connection that never expires, since every
/// SQLite in-memory connection is its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_tables(&pool).await?;
    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_collections_table(pool).await?;
    create_ratings_table(pool).await?;
    Ok(())
}

/// Create the collections table
///
/// Names are deliberately not unique.
pub async fn create_collections_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_collections_created_at ON collections(created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the ratings table
///
/// Requires the collections table for its foreign key.
pub async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            guid TEXT PRIMARY KEY,
            collection_id TEXT NOT NULL REFERENCES collections(guid),
            name TEXT NOT NULL,
            picture TEXT NOT NULL DEFAULT '',
            rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 10),
            review TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Listing by collection, newest first
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ratings_collection_created ON ratings(collection_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Extract the file path from a `sqlite:` URL
fn file_path_of(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        None
    } else {
        Some(Path::new(path))
    }
}
