//! Collection endpoints
//!
//! - `GET /collections` list with live rating counts
//! - `GET /collections/:id`
//! - `POST /collections`
//! - `PUT /collections/:id` partial update
//! - `DELETE /collections/:id` cascades to the collection's ratings

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rateshelf_common::models::{
    CreateCollectionRequest, MessageResponse, UpdateCollectionRequest,
};
use rateshelf_common::Collection;

use crate::{ApiError, ApiResult, AppState};

/// GET /collections
pub async fn list_collections(State(state): State<AppState>) -> ApiResult<Json<Vec<Collection>>> {
    let collections = state
        .collections()
        .list()
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to fetch collections"))?;
    Ok(Json(collections))
}

/// GET /collections/:id
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Collection>> {
    let collection = state
        .collections()
        .get(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to fetch collection"))?;
    Ok(Json(collection))
}

/// POST /collections
///
/// **Request:** `{"name": "Movies", "description": "optional"}`
/// **Response:** 201 with the stored collection (`ratingCount` 0)
pub async fn create_collection(
    State(state): State<AppState>,
    body: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let Json(request) = body?;
    let collection = state
        .collections()
        .create(&request)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to create collection"))?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// PUT /collections/:id
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCollectionRequest>, JsonRejection>,
) -> ApiResult<Json<Collection>> {
    let Json(request) = body?;
    let collection = state
        .collections()
        .update(&id, &request)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to update collection"))?;
    Ok(Json(collection))
}

/// DELETE /collections/:id
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .collections()
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to delete collection"))?;
    Ok(Json(MessageResponse {
        message: "Collection deleted successfully".to_string(),
    }))
}

/// Build collection routes
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections).post(create_collection))
        .route(
            "/collections/:id",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
}
