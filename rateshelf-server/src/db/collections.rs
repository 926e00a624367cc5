//! Collection table operations

use chrono::{DateTime, Utc};
use rateshelf_common::time::to_storage;
use rateshelf_common::Collection;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::decode_timestamp;

/// Every read annotates the row with its live rating count
const SELECT_WITH_COUNT: &str = r#"
    SELECT c.guid, c.name, c.description, c.created_at,
           (SELECT COUNT(*) FROM ratings r WHERE r.collection_id = c.guid) AS rating_count
    FROM collections c
"#;

fn from_row(row: &SqliteRow) -> Result<Collection, sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Collection {
        id: row.try_get("guid")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: decode_timestamp(&created_at)?,
        rating_count: row.try_get("rating_count")?,
    })
}

/// All collections, newest first
pub async fn list_collections(pool: &SqlitePool) -> Result<Vec<Collection>, sqlx::Error> {
    let sql = format!("{SELECT_WITH_COUNT} ORDER BY c.created_at DESC, c.rowid DESC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(from_row).collect()
}

/// Load one collection by id
pub async fn load_collection(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<Collection>, sqlx::Error> {
    let sql = format!("{SELECT_WITH_COUNT} WHERE c.guid = ?");
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(from_row).transpose()
}

/// Whether a collection with this id exists
pub async fn collection_exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM collections WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

/// Insert a new collection row
pub async fn insert_collection(
    pool: &SqlitePool,
    id: Uuid,
    name: &str,
    description: &str,
    created_at: &DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO collections (guid, name, description, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(description)
    .bind(to_storage(created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply a partial update; `None` leaves a column unchanged
///
/// Returns the number of rows touched (0 when the id is unknown).
pub async fn update_collection(
    pool: &SqlitePool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE collections
        SET name = COALESCE(?, name),
            description = COALESCE(?, description)
        WHERE guid = ?
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Delete the collection row only; callers remove its ratings first
pub async fn delete_collection<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM collections WHERE guid = ?")
        .bind(id.to_string())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
