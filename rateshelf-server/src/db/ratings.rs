//! Rating table operations

use chrono::{DateTime, Utc};
use rateshelf_common::time::to_storage;
use rateshelf_common::validation::RatingChanges;
use rateshelf_common::Rating;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::decode_timestamp;

const SELECT_RATING: &str = r#"
    SELECT guid, collection_id, name, picture, rating, review, created_at
    FROM ratings
"#;

/// Fields of a rating about to be inserted
#[derive(Debug, Clone)]
pub struct NewRating<'a> {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub name: &'a str,
    pub picture: &'a str,
    pub rating: f64,
    pub review: &'a str,
    pub created_at: DateTime<Utc>,
}

fn from_row(row: &SqliteRow) -> Result<Rating, sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Rating {
        id: row.try_get("guid")?,
        collection_id: row.try_get("collection_id")?,
        name: row.try_get("name")?,
        picture: row.try_get("picture")?,
        rating: row.try_get("rating")?,
        review: row.try_get("review")?,
        created_at: Some(decode_timestamp(&created_at)?),
    })
}

/// All ratings across collections, newest first
pub async fn list_ratings(pool: &SqlitePool) -> Result<Vec<Rating>, sqlx::Error> {
    let sql = format!("{SELECT_RATING} ORDER BY created_at DESC, rowid DESC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(from_row).collect()
}

/// Ratings of one collection, newest first
pub async fn list_ratings_for_collection(
    pool: &SqlitePool,
    collection_id: Uuid,
) -> Result<Vec<Rating>, sqlx::Error> {
    let sql = format!(
        "{SELECT_RATING} WHERE collection_id = ? ORDER BY created_at DESC, rowid DESC"
    );
    let rows = sqlx::query(&sql)
        .bind(collection_id.to_string())
        .fetch_all(pool)
        .await?;
    rows.iter().map(from_row).collect()
}

/// Load one rating by id
pub async fn load_rating(pool: &SqlitePool, id: Uuid) -> Result<Option<Rating>, sqlx::Error> {
    let sql = format!("{SELECT_RATING} WHERE guid = ?");
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(from_row).transpose()
}

/// Insert a rating row
pub async fn insert_rating<'e, E>(executor: E, rating: &NewRating<'_>) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO ratings (guid, collection_id, name, picture, rating, review, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rating.id.to_string())
    .bind(rating.collection_id.to_string())
    .bind(rating.name)
    .bind(rating.picture)
    .bind(rating.rating)
    .bind(rating.review)
    .bind(to_storage(&rating.created_at))
    .execute(executor)
    .await?;

    Ok(())
}

/// Apply validated changes; absent fields keep their stored value
///
/// `collection_id` is never touched. Returns rows affected.
pub async fn update_rating(
    pool: &SqlitePool,
    id: Uuid,
    changes: &RatingChanges,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE ratings
        SET name = COALESCE(?, name),
            picture = COALESCE(?, picture),
            rating = COALESCE(?, rating),
            review = COALESCE(?, review)
        WHERE guid = ?
        "#,
    )
    .bind(changes.name.as_deref())
    .bind(changes.picture.as_deref())
    .bind(changes.rating)
    .bind(changes.review.as_deref())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Delete one rating; returns rows affected
pub async fn delete_rating(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM ratings WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Delete every rating of a collection; returns how many were removed
pub async fn delete_ratings_for_collection<'e, E>(
    executor: E,
    collection_id: Uuid,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM ratings WHERE collection_id = ?")
        .bind(collection_id.to_string())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
