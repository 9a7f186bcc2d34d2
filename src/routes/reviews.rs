//! Review routes. Listing works signed out; mutations need a session and
//! answer with the refreshed listing.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::auth::{AuthUser, MaybeUser};
use crate::services::reviews::{self, ReviewInput, ReviewListing};
use crate::state::AppState;

/// `?confirm=true` on destructive requests.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// `GET /api/discovery/{id}/reviews`
pub async fn list(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ReviewListing>, ApiError> {
    Ok(Json(reviews::listing(&state.pool, item_id, viewer.id()).await?))
}

/// `POST /api/discovery/{id}/reviews`
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<ReviewListing>), ApiError> {
    let listing = reviews::create_review(&state.pool, user.id, item_id, input).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// `PUT /api/reviews/{id}`
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(review_id): Path<Uuid>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<ReviewListing>, ApiError> {
    Ok(Json(reviews::update_review(&state.pool, user.id, review_id, input).await?))
}

/// `DELETE /api/reviews/{id}?confirm=true`
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(review_id): Path<Uuid>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<ReviewListing>, ApiError> {
    Ok(Json(reviews::delete_review(&state.pool, user.id, review_id, query.confirm).await?))
}
