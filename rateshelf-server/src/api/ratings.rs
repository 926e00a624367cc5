//! Rating endpoints
//!
//! Ratings are created inside a collection (`POST /ratings/collection/:id`)
//! and addressed by their own id afterwards.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rateshelf_common::models::{MessageResponse, RatingPatch, RatingPayload};
use rateshelf_common::Rating;

use crate::{ApiError, ApiResult, AppState};

/// GET /ratings
pub async fn list_all_ratings(State(state): State<AppState>) -> ApiResult<Json<Vec<Rating>>> {
    let ratings = state
        .ratings()
        .list_all()
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to fetch ratings"))?;
    Ok(Json(ratings))
}

/// GET /ratings/collection/:collection_id
pub async fn list_collection_ratings(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> ApiResult<Json<Vec<Rating>>> {
    let ratings = state
        .ratings()
        .list_by_collection(&collection_id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to fetch ratings"))?;
    Ok(Json(ratings))
}

/// POST /ratings/collection/:collection_id
///
/// **Request:** `{"name", "rating", "review", "picture"?, "createdAt"?}`
/// **Errors:** 404 when the collection is missing, 400 on validation
pub async fn create_rating(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
    body: Result<Json<RatingPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Rating>)> {
    let Json(payload) = body?;
    let rating = state
        .ratings()
        .create(&collection_id, &payload)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to create rating"))?;
    Ok((StatusCode::CREATED, Json(rating)))
}

/// GET /ratings/:id
pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Rating>> {
    let rating = state
        .ratings()
        .get(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to fetch rating"))?;
    Ok(Json(rating))
}

/// PUT /ratings/:id
pub async fn update_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RatingPatch>, JsonRejection>,
) -> ApiResult<Json<Rating>> {
    let Json(patch) = body?;
    let rating = state
        .ratings()
        .update(&id, &patch)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to update rating"))?;
    Ok(Json(rating))
}

/// DELETE /ratings/:id
pub async fn delete_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .ratings()
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to delete rating"))?;
    Ok(Json(MessageResponse {
        message: "Rating deleted successfully".to_string(),
    }))
}

/// Build rating routes
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/ratings", get(list_all_ratings))
        .route(
            "/ratings/collection/:collection_id",
            get(list_collection_ratings).post(create_rating),
        )
        .route(
            "/ratings/:id",
            get(get_rating).put(update_rating).delete(delete_rating),
        )
}
