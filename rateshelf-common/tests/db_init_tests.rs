//! Tests for database initialization

use rateshelf_common::db::init::{init_database, init_memory_database};
use tempfile::TempDir;

async fn table_names(pool: &sqlx::SqlitePool) -> Vec<String> {
    sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .fetch_all(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("shelf.db");
    let url = format!("sqlite://{}", db_path.display());

    let pool = init_database(&url).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");

    let tables = table_names(&pool.unwrap()).await;
    assert!(tables.contains(&"collections".to_string()));
    assert!(tables.contains(&"ratings".to_string()));
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("shelf.db").display());

    let first = init_database(&url).await.unwrap();
    sqlx::query(
        "INSERT INTO collections (guid, name, description, created_at) VALUES ('a', 'Movies', '', '2024-01-01T00:00:00.000Z')",
    )
    .execute(&first)
    .await
    .unwrap();
    first.close().await;

    // Second open keeps existing rows
    let second = init_database(&url).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collections")
        .fetch_one(&second)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_rating_requires_existing_collection() {
    let pool = init_memory_database().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO ratings (guid, collection_id, name, picture, rating, review, created_at)
         VALUES ('r', 'missing', 'Dune', '', 5, 'ok', '2024-01-01T00:00:00.000Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Foreign key should reject orphan rating");
}

#[tokio::test]
async fn test_rating_range_checked_by_store() {
    let pool = init_memory_database().await.unwrap();
    sqlx::query(
        "INSERT INTO collections (guid, name, description, created_at) VALUES ('c', 'Movies', '', '2024-01-01T00:00:00.000Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = sqlx::query(
        "INSERT INTO ratings (guid, collection_id, name, picture, rating, review, created_at)
         VALUES ('r', 'c', 'Dune', '', 10.5, 'ok', '2024-01-01T00:00:00.000Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}
