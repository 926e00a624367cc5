//! Rating CRUD scoped to collections

use rateshelf_common::models::{RatingPatch, RatingPayload};
use rateshelf_common::time::now;
use rateshelf_common::validation::{validate_rating, validate_rating_patch};
use rateshelf_common::{uuid_utils, Rating};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::db;
use crate::db::ratings::NewRating;

const ENTITY: &str = "Rating";
const PARENT: &str = "Collection";

#[derive(Clone)]
pub struct RatingService {
    db: SqlitePool,
}

impl RatingService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Ratings of one collection, newest first
    ///
    /// An unknown collection is an error rather than an empty list.
    pub async fn list_by_collection(&self, collection_id: &str) -> ServiceResult<Vec<Rating>> {
        let collection_id = uuid_utils::parse(collection_id).ok_or(ServiceError::NotFound(PARENT))?;
        if !db::collections::collection_exists(&self.db, collection_id).await? {
            return Err(ServiceError::NotFound(PARENT));
        }

        let ratings = db::ratings::list_ratings_for_collection(&self.db, collection_id).await?;
        debug!("Collection {} has {} ratings", collection_id, ratings.len());
        Ok(ratings)
    }

    /// Every rating across all collections, newest first
    pub async fn list_all(&self) -> ServiceResult<Vec<Rating>> {
        Ok(db::ratings::list_ratings(&self.db).await?)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Rating> {
        let id = parse_id(id)?;
        db::ratings::load_rating(&self.db, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// Create a rating inside `collection_id`
    ///
    /// The path collection wins over any `collectionId` in the body. The
    /// collection is checked before the payload so a missing parent is
    /// reported as 404 even when the payload is also invalid.
    pub async fn create(
        &self,
        collection_id: &str,
        payload: &RatingPayload,
    ) -> ServiceResult<Rating> {
        let collection_id = uuid_utils::parse(collection_id).ok_or(ServiceError::NotFound(PARENT))?;
        if !db::collections::collection_exists(&self.db, collection_id).await? {
            warn!("Rating rejected: collection {} does not exist", collection_id);
            return Err(ServiceError::NotFound(PARENT));
        }

        let draft = validate_rating(payload)?;
        if let Some(body_collection) = payload.collection_id.as_deref() {
            if body_collection != collection_id.to_string() {
                debug!(
                    "Ignoring body collectionId {} in favour of path {}",
                    body_collection, collection_id
                );
            }
        }

        let id = uuid_utils::generate();
        let created_at = draft.created_at.unwrap_or_else(now);
        db::ratings::insert_rating(
            &self.db,
            &NewRating {
                id,
                collection_id,
                name: &draft.name,
                picture: &draft.picture,
                rating: draft.rating,
                review: &draft.review,
                created_at,
            },
        )
        .await?;

        info!(
            "Rating created: {} ({}) in collection {}",
            draft.name, id, collection_id
        );
        Ok(Rating {
            id: id.to_string(),
            collection_id: collection_id.to_string(),
            name: draft.name,
            picture: draft.picture,
            rating: draft.rating,
            review: draft.review,
            created_at: Some(created_at),
        })
    }

    /// Apply a partial update and return the stored result
    pub async fn update(&self, id: &str, patch: &RatingPatch) -> ServiceResult<Rating> {
        let id = parse_id(id)?;
        let existing = db::ratings::load_rating(&self.db, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;

        let changes = validate_rating_patch(patch)?;
        if changes.is_empty() {
            debug!("Empty update for rating {}", id);
            return Ok(existing);
        }

        if db::ratings::update_rating(&self.db, id, &changes).await? == 0 {
            return Err(ServiceError::NotFound(ENTITY));
        }

        info!("Rating updated: {}", id);
        db::ratings::load_rating(&self.db, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let id = parse_id(id)?;
        if db::ratings::delete_rating(&self.db, id).await? == 0 {
            return Err(ServiceError::NotFound(ENTITY));
        }
        info!("Rating deleted: {}", id);
        Ok(())
    }
}

fn parse_id(raw: &str) -> ServiceResult<Uuid> {
    uuid_utils::parse(raw).ok_or(ServiceError::NotFound(ENTITY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use crate::services::CollectionService;
    use rateshelf_common::models::CreateCollectionRequest;
    use rateshelf_common::validation::ValidationError;
    use serde_json::json;

    async fn services() -> (CollectionService, RatingService, String) {
        let pool = init_memory_database().await.unwrap();
        let collections = CollectionService::new(pool.clone());
        let collection = collections
            .create(&CreateCollectionRequest {
                name: Some("Movies".to_string()),
                description: None,
            })
            .await
            .unwrap();
        (collections, RatingService::new(pool), collection.id)
    }

    fn payload(name: &str, rating: serde_json::Value, review: &str) -> RatingPayload {
        RatingPayload {
            name: Some(name.to_string()),
            rating: Some(rating),
            review: Some(review.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_uses_path_collection() {
        let (_, ratings, collection_id) = services().await;
        let mut body = payload("Arrival", json!(9), "Great");
        body.collection_id = Some("someone-else".to_string());

        let created = ratings.create(&collection_id, &body).await.unwrap();
        assert_eq!(created.collection_id, collection_id);
        assert!(created.created_at.is_some());
        assert_eq!(ratings.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_missing_collection_checked_before_payload() {
        let (_, ratings, _) = services().await;
        let err = ratings
            .create(&Uuid::new_v4().to_string(), &RatingPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Collection")));
        assert_eq!(err.to_string(), "Collection not found");
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_validation_error() {
        let (_, ratings, collection_id) = services().await;
        let err = ratings
            .create(&collection_id, &payload("Arrival", json!(11), "Great"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::RatingOutOfRange)
        ));
    }

    #[tokio::test]
    async fn test_client_date_is_honoured() {
        let (_, ratings, collection_id) = services().await;
        let mut body = payload("Arrival", json!(9), "Great");
        body.created_at = Some("2024-03-01".to_string());

        let created = ratings.create(&collection_id, &body).await.unwrap();
        assert_eq!(
            created.created_at.map(|ts| ts.format("%Y-%m-%d").to_string()),
            Some("2024-03-01".to_string())
        );
    }

    #[tokio::test]
    async fn test_patch_keeps_unsupplied_fields() {
        let (_, ratings, collection_id) = services().await;
        let created = ratings
            .create(&collection_id, &payload("Arrival", json!(9), "Great"))
            .await
            .unwrap();

        let updated = ratings
            .update(
                &created.id,
                &RatingPatch {
                    rating: Some(json!(4)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 4.0);
        assert_eq!(updated.name, "Arrival");
        assert_eq!(updated.review, "Great");
        assert_eq!(updated.collection_id, collection_id);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_cascade_delete_removes_ratings() {
        let (collections, ratings, collection_id) = services().await;
        let mut ids = Vec::new();
        for name in ["A", "B", "C"] {
            let rating = ratings
                .create(&collection_id, &payload(name, json!(5), "ok"))
                .await
                .unwrap();
            ids.push(rating.id);
        }

        assert_eq!(collections.delete(&collection_id).await.unwrap(), 3);
        for id in &ids {
            assert!(matches!(ratings.get(id).await, Err(ServiceError::NotFound("Rating"))));
        }
        assert!(matches!(
            ratings.list_by_collection(&collection_id).await,
            Err(ServiceError::NotFound("Collection"))
        ));
        assert!(ratings.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (_, ratings, collection_id) = services().await;
        let created = ratings
            .create(&collection_id, &payload("Arrival", json!(9), "Great"))
            .await
            .unwrap();
        ratings.delete(&created.id).await.unwrap();
        assert!(matches!(
            ratings.delete(&created.id).await,
            Err(ServiceError::NotFound("Rating"))
        ));
    }
}
