//! Reviews on discovery items.
//!
//! DESIGN
//! ======
//! A viewer may hold one review per item. The listing tells the client
//! whether to offer "write review" (`can_create_review`) and which entries
//! the viewer may edit or delete; the unique index on
//! `(discovery_item_id, user_id)` backs that up at the database.
//!
//! Every mutation answers with the refetched listing for the item. There is
//! no optimistic update and no conflict detection: the last write wins.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{ErrorCode, is_foreign_key_violation, is_unique_violation};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("review not found: {0}")]
    NotFound(Uuid),
    #[error("discovery item not found: {0}")]
    ItemNotFound(Uuid),
    #[error("rating must be between {MIN_RATING} and {MAX_RATING}, got {0}")]
    InvalidRating(i32),
    #[error("you have already reviewed this item")]
    AlreadyReviewed,
    #[error("only the author can change this review")]
    NotOwner,
    #[error("deleting a review must be confirmed")]
    ConfirmationRequired,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for ReviewError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_REVIEW_NOT_FOUND",
            Self::ItemNotFound(_) => "E_ITEM_NOT_FOUND",
            Self::InvalidRating(_) => "E_INVALID_RATING",
            Self::AlreadyReviewed => "E_ALREADY_REVIEWED",
            Self::NotOwner => "E_NOT_OWNER",
            Self::ConfirmationRequired => "E_CONFIRMATION_REQUIRED",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::ItemNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRating(_) | Self::ConfirmationRequired => StatusCode::BAD_REQUEST,
            Self::AlreadyReviewed => StatusCode::CONFLICT,
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Row from `reviews`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub discovery_item_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_anonymous: Option<bool>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl ReviewInput {
    /// Check the rating range and normalise a blank comment to `None`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRating` outside 1..=5.
    pub fn validate(self) -> Result<Self, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewError::InvalidRating(self.rating));
        }
        let comment = self
            .comment
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        Ok(Self { comment, ..self })
    }
}

/// One review as shown to a particular viewer.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: Uuid,
    pub discovery_item_id: Uuid,
    /// Hidden from other viewers when the review is anonymous.
    pub user_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_anonymous: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Reviews for one item plus the viewer's permissions.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewListing {
    pub discovery_item_id: Uuid,
    pub review_count: usize,
    pub reviews: Vec<ReviewView>,
    pub viewer_review_id: Option<Uuid>,
    pub can_create_review: bool,
    pub requires_sign_in: bool,
}

impl ReviewListing {
    /// Build the listing as `viewer` sees it. `None` means signed out.
    #[must_use]
    pub fn for_viewer(discovery_item_id: Uuid, reviews: Vec<Review>, viewer: Option<Uuid>) -> Self {
        let viewer_review_id = viewer.and_then(|v| reviews.iter().find(|r| r.user_id == v).map(|r| r.id));

        let views: Vec<ReviewView> = reviews
            .into_iter()
            .map(|r| {
                let is_owner = viewer == Some(r.user_id);
                let is_anonymous = r.is_anonymous.unwrap_or(false);
                ReviewView {
                    id: r.id,
                    discovery_item_id: r.discovery_item_id,
                    user_id: if is_anonymous && !is_owner { None } else { Some(r.user_id) },
                    rating: r.rating,
                    comment: r.comment,
                    is_anonymous,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                    can_edit: is_owner,
                    can_delete: is_owner,
                }
            })
            .collect();

        Self {
            discovery_item_id,
            review_count: views.len(),
            reviews: views,
            viewer_review_id,
            can_create_review: viewer.is_some() && viewer_review_id.is_none(),
            requires_sign_in: viewer.is_none(),
        }
    }
}

pub(crate) fn ensure_owner(review: &Review, viewer: Uuid) -> Result<(), ReviewError> {
    if review.user_id == viewer { Ok(()) } else { Err(ReviewError::NotOwner) }
}

// =============================================================================
// QUERIES
// =============================================================================

const REVIEW_COLUMNS: &str =
    "id, discovery_item_id, user_id, rating, comment, is_anonymous, created_at, updated_at";

/// All reviews for an item, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_reviews(pool: &PgPool, discovery_item_id: Uuid) -> Result<Vec<Review>, ReviewError> {
    let rows = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE discovery_item_id = $1 ORDER BY created_at DESC"
    ))
    .bind(discovery_item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch reviews and shape them for `viewer`.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn listing(pool: &PgPool, discovery_item_id: Uuid, viewer: Option<Uuid>) -> Result<ReviewListing, ReviewError> {
    let reviews = list_reviews(pool, discovery_item_id).await?;
    Ok(ReviewListing::for_viewer(discovery_item_id, reviews, viewer))
}

async fn load_review(pool: &PgPool, review_id: Uuid) -> Result<Review, ReviewError> {
    sqlx::query_as::<_, Review>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
        .bind(review_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ReviewError::NotFound(review_id))
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// Create the viewer's review on an item.
///
/// # Errors
///
/// `InvalidRating`, `AlreadyReviewed` when the viewer already has one,
/// `ItemNotFound` when the item does not exist.
pub async fn create_review(
    pool: &PgPool,
    viewer: Uuid,
    discovery_item_id: Uuid,
    input: ReviewInput,
) -> Result<ReviewListing, ReviewError> {
    let input = input.validate()?;

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM reviews WHERE discovery_item_id = $1 AND user_id = $2")
        .bind(discovery_item_id)
        .bind(viewer)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(ReviewError::AlreadyReviewed);
    }

    sqlx::query(
        "INSERT INTO reviews (discovery_item_id, user_id, rating, comment, is_anonymous) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(discovery_item_id)
    .bind(viewer)
    .bind(input.rating)
    .bind(&input.comment)
    .bind(input.is_anonymous)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ReviewError::AlreadyReviewed
        } else if is_foreign_key_violation(&e) {
            ReviewError::ItemNotFound(discovery_item_id)
        } else {
            ReviewError::Database(e)
        }
    })?;

    tracing::info!(%discovery_item_id, user_id = %viewer, rating = input.rating, "review created");
    listing(pool, discovery_item_id, Some(viewer)).await
}

/// Update the viewer's own review.
///
/// # Errors
///
/// `NotFound`, `NotOwner`, or `InvalidRating`.
pub async fn update_review(
    pool: &PgPool,
    viewer: Uuid,
    review_id: Uuid,
    input: ReviewInput,
) -> Result<ReviewListing, ReviewError> {
    let input = input.validate()?;
    let review = load_review(pool, review_id).await?;
    ensure_owner(&review, viewer)?;

    sqlx::query(
        "UPDATE reviews SET rating = $2, comment = $3, is_anonymous = $4, updated_at = now() WHERE id = $1",
    )
    .bind(review_id)
    .bind(input.rating)
    .bind(&input.comment)
    .bind(input.is_anonymous)
    .execute(pool)
    .await?;

    tracing::info!(%review_id, user_id = %viewer, "review updated");
    listing(pool, review.discovery_item_id, Some(viewer)).await
}

/// Delete the viewer's own review once the caller has confirmed.
///
/// # Errors
///
/// `ConfirmationRequired` when `confirmed` is false, `NotFound`, `NotOwner`.
pub async fn delete_review(
    pool: &PgPool,
    viewer: Uuid,
    review_id: Uuid,
    confirmed: bool,
) -> Result<ReviewListing, ReviewError> {
    if !confirmed {
        return Err(ReviewError::ConfirmationRequired);
    }
    let review = load_review(pool, review_id).await?;
    ensure_owner(&review, viewer)?;

    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(review_id)
        .execute(pool)
        .await?;

    tracing::info!(%review_id, user_id = %viewer, "review deleted");
    listing(pool, review.discovery_item_id, Some(viewer)).await
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
