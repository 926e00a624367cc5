//! Collection CRUD with cascading delete

use rateshelf_common::models::{CreateCollectionRequest, UpdateCollectionRequest};
use rateshelf_common::time::now;
use rateshelf_common::validation::validate_collection_name;
use rateshelf_common::{uuid_utils, Collection};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{classify, ServiceError, ServiceResult};
use crate::db;

const ENTITY: &str = "Collection";

#[derive(Clone)]
pub struct CollectionService {
    db: SqlitePool,
}

impl CollectionService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All collections, newest first, each with its live rating count
    pub async fn list(&self) -> ServiceResult<Vec<Collection>> {
        let collections = db::collections::list_collections(&self.db).await?;
        debug!("Listed {} collections", collections.len());
        Ok(collections)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Collection> {
        let id = parse_id(id)?;
        db::collections::load_collection(&self.db, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// Create a collection; the name is trimmed and must not be empty
    pub async fn create(&self, request: &CreateCollectionRequest) -> ServiceResult<Collection> {
        let name = validate_collection_name(request.name.as_deref())?;
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let id = uuid_utils::generate();
        let created_at = now();

        db::collections::insert_collection(&self.db, id, &name, &description, &created_at)
            .await
            .map_err(|e| classify(e, "A collection with this name already exists"))?;

        info!("Collection created: {} ({})", name, id);
        Ok(Collection {
            id: id.to_string(),
            name,
            description,
            created_at,
            rating_count: 0,
        })
    }

    /// Partial update of name and/or description
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateCollectionRequest,
    ) -> ServiceResult<Collection> {
        let id = parse_id(id)?;

        let name = match request.name.as_deref() {
            Some(name) => Some(validate_collection_name(Some(name))?),
            None => None,
        };
        let description = request.description.as_deref().map(str::trim);

        let touched =
            db::collections::update_collection(&self.db, id, name.as_deref(), description)
                .await
                .map_err(|e| classify(e, "A collection with this name already exists"))?;
        if touched == 0 {
            return Err(ServiceError::NotFound(ENTITY));
        }

        info!("Collection updated: {}", id);
        db::collections::load_collection(&self.db, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// Delete a collection and every rating in it
    ///
    /// Ratings go first, then the collection, in one transaction.
    /// Returns how many ratings were removed.
    pub async fn delete(&self, id: &str) -> ServiceResult<u64> {
        let id = parse_id(id)?;

        let mut tx = self.db.begin().await?;
        let removed = db::ratings::delete_ratings_for_collection(&mut *tx, id).await?;
        let deleted = db::collections::delete_collection(&mut *tx, id).await?;

        if deleted == 0 {
            tx.rollback().await?;
            return Err(ServiceError::NotFound(ENTITY));
        }
        tx.commit().await?;

        info!("Collection {} deleted along with {} ratings", id, removed);
        Ok(removed)
    }
}

fn parse_id(raw: &str) -> ServiceResult<Uuid> {
    uuid_utils::parse(raw).ok_or(ServiceError::NotFound(ENTITY))
}
