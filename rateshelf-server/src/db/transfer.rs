//! Whole-store export and import
//!
//! A snapshot is a single JSON document holding every collection and every
//! rating in wire form. Import writes into the target store inside one
//! transaction, collections before ratings.

use chrono::{DateTime, Utc};
use rateshelf_common::time::{now, to_storage};
use rateshelf_common::{uuid_utils, Collection, Rating};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use super::{collections, ratings};

/// Serialized contents of a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub exported_at: DateTime<Utc>,
    pub collections: Vec<Collection>,
    pub ratings: Vec<Rating>,
}

/// Counts written by an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub collections: usize,
    pub ratings: usize,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid identifier in snapshot: {0}")]
    InvalidId(String),
}

/// Read the whole store
pub async fn export_snapshot(pool: &SqlitePool) -> Result<Snapshot, sqlx::Error> {
    let collections = collections::list_collections(pool).await?;
    let ratings = ratings::list_ratings(pool).await?;
    info!(
        "Exported {} collections and {} ratings",
        collections.len(),
        ratings.len()
    );
    Ok(Snapshot {
        exported_at: now(),
        collections,
        ratings,
    })
}

/// Write a snapshot into the store
///
/// Any failure (duplicate id, rating pointing at a collection that is in
/// neither the snapshot nor the store, out-of-range score) rolls the whole
/// import back.
pub async fn import_snapshot(
    pool: &SqlitePool,
    snapshot: &Snapshot,
) -> Result<ImportSummary, TransferError> {
    let mut tx = pool.begin().await?;

    for collection in &snapshot.collections {
        let id = parse_id(&collection.id)?;
        sqlx::query(
            "INSERT INTO collections (guid, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(to_storage(&collection.created_at))
        .execute(&mut *tx)
        .await?;
    }

    for rating in &snapshot.ratings {
        let new_rating = ratings::NewRating {
            id: parse_id(&rating.id)?,
            collection_id: parse_id(&rating.collection_id)?,
            name: &rating.name,
            picture: &rating.picture,
            rating: rating.rating,
            review: &rating.review,
            created_at: rating.created_at.unwrap_or_else(now),
        };
        ratings::insert_rating(&mut *tx, &new_rating).await?;
    }

    tx.commit().await?;

    let summary = ImportSummary {
        collections: snapshot.collections.len(),
        ratings: snapshot.ratings.len(),
    };
    info!(
        "Imported {} collections and {} ratings",
        summary.collections, summary.ratings
    );
    Ok(summary)
}

fn parse_id(raw: &str) -> Result<uuid::Uuid, TransferError> {
    uuid_utils::parse(raw).ok_or_else(|| TransferError::InvalidId(raw.to_string()))
}
