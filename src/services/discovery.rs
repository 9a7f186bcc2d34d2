//! Discovery directory: places, events and businesses.
//!
//! DESIGN
//! ======
//! Items are plain rows in `discovery_items`. Reads join the category and
//! let Postgres derive `average_rating` / `review_count` from `reviews`;
//! nothing is aggregated in Rust. Writes are single statements with no
//! local invariant enforcement beyond presence and type checks.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, QueryBuilder};
use time::{OffsetDateTime, PrimitiveDateTime};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use uuid::Uuid;

use crate::error::ErrorCode;

pub const DEFAULT_PREVIEW_LIMIT: i64 = 6;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("discovery item not found: {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for DiscoveryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ITEM_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_ITEM",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "discovery_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryItemType {
    Event,
    Place,
    Business,
}

impl DiscoveryItemType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Place => "place",
            Self::Business => "business",
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw.trim() {
            "event" => Some(Self::Event),
            "place" => Some(Self::Place),
            "business" => Some(Self::Business),
            _ => None,
        }
    }

    /// Parse a listing filter where `all` (or nothing) means no filter.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for anything other than a known type or `all`.
    pub fn parse_filter(raw: Option<&str>) -> Result<Option<Self>, DiscoveryError> {
        match raw.map(str::trim) {
            None | Some("" | "all") => Ok(None),
            Some(value) => Self::from_str(value)
                .map(Some)
                .ok_or_else(|| DiscoveryError::Invalid(format!("unknown discovery item type: {value}"))),
        }
    }
}

/// Directory entry as returned to clients.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DiscoveryItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub item_type: DiscoveryItemType,
    pub category_id: Option<Uuid>,
    pub address: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub event_date: Option<OffsetDateTime>,
    pub event_time: Option<String>,
    pub image_url: Option<String>,
    pub logo_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub contact_info: Option<serde_json::Value>,
    pub is_featured: Option<bool>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub category_name: Option<String>,
    pub category_description: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub item_type: DiscoveryItemType,
    pub description: Option<String>,
}

/// Insert/update payload for `discovery_items`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiscoveryItem {
    pub name: String,
    pub description: Option<String>,
    pub item_type: DiscoveryItemType,
    pub category_id: Option<Uuid>,
    pub address: Option<String>,
    pub event_date: Option<OffsetDateTime>,
    pub event_time: Option<String>,
    pub image_url: Option<String>,
    pub logo_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub contact_info: Option<serde_json::Value>,
    pub is_featured: bool,
}

/// Admin form body. Text fields arrive as the form holds them: empty
/// strings for "unset" and tags as one comma-separated string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryItemForm {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: String,
    pub category_id: Option<String>,
    pub address: Option<String>,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub image_url: Option<String>,
    pub logo_url: Option<String>,
    pub tags: Option<String>,
    pub contact_info: Option<serde_json::Value>,
    #[serde(default)]
    pub is_featured: bool,
}

impl DiscoveryItemForm {
    /// Coerce the form into an insertable record.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a blank name, unknown type, malformed category
    /// id or unparseable event date.
    pub fn into_new_item(self) -> Result<NewDiscoveryItem, DiscoveryError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(DiscoveryError::Invalid("name is required".into()));
        }
        let item_type = DiscoveryItemType::from_str(&self.item_type)
            .ok_or_else(|| DiscoveryError::Invalid(format!("unknown discovery item type: {}", self.item_type)))?;
        let category_id = match blank_to_none(self.category_id) {
            Some(raw) => Some(
                Uuid::parse_str(&raw).map_err(|_| DiscoveryError::Invalid(format!("invalid category id: {raw}")))?,
            ),
            None => None,
        };
        let event_date = match blank_to_none(self.event_date) {
            Some(raw) => Some(
                parse_event_date(&raw).map_err(|_| DiscoveryError::Invalid(format!("invalid event date: {raw}")))?,
            ),
            None => None,
        };

        Ok(NewDiscoveryItem {
            name,
            description: blank_to_none(self.description),
            item_type,
            category_id,
            address: blank_to_none(self.address),
            event_date,
            event_time: blank_to_none(self.event_time),
            image_url: blank_to_none(self.image_url),
            logo_url: blank_to_none(self.logo_url),
            tags: self.tags.as_deref().and_then(split_comma_tags),
            contact_info: self.contact_info,
            is_featured: self.is_featured,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ItemFilter {
    pub item_type: Option<DiscoveryItemType>,
    pub category_id: Option<Uuid>,
}

// =============================================================================
// COERCION HELPERS
// =============================================================================

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Split `"music, community,"` into `["music", "community"]`.
pub(crate) fn split_comma_tags(raw: &str) -> Option<Vec<String>> {
    let tags: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect();
    if tags.is_empty() { None } else { Some(tags) }
}

/// Parse an RFC 3339 timestamp, a zone-less date-time read as UTC, or a
/// bare `YYYY-MM-DD` date at midnight UTC. The zone-less form takes either
/// `T` or a space between date and time, and seconds are optional.
///
/// # Errors
///
/// Returns the date-only parse error when no format matches.
pub fn parse_event_date(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    let local_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute][optional [:[second]]]"),
        format_description!("[year]-[month]-[day] [hour]:[minute][optional [:[second]]]"),
    ];
    for format in local_formats {
        if let Ok(ts) = PrimitiveDateTime::parse(raw, format) {
            return Ok(ts.assume_utc());
        }
    }
    let date = time::Date::parse(raw, format_description!("[year]-[month]-[day]"))?;
    Ok(date.midnight().assume_utc())
}

// =============================================================================
// READS
// =============================================================================

const ITEM_SELECT: &str = "SELECT d.id, d.name, d.description, d.type, d.category_id, d.address, \
     d.event_date, d.event_time, d.image_url, d.logo_url, d.tags, d.contact_info, d.is_featured, \
     d.created_by, d.created_at, d.updated_at, \
     c.name AS category_name, c.description AS category_description, \
     AVG(r.rating)::float8 AS average_rating, COUNT(r.id) AS review_count \
     FROM discovery_items d \
     LEFT JOIN categories c ON c.id = d.category_id \
     LEFT JOIN reviews r ON r.discovery_item_id = d.id \
     WHERE TRUE";

const ITEM_GROUP_BY: &str = " GROUP BY d.id, c.name, c.description";

/// List items newest first, optionally filtered by type and category.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_items(pool: &PgPool, filter: ItemFilter) -> Result<Vec<DiscoveryItem>, DiscoveryError> {
    let mut builder = QueryBuilder::new(ITEM_SELECT);
    if let Some(item_type) = filter.item_type {
        builder.push(" AND d.type = ").push_bind(item_type);
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND d.category_id = ").push_bind(category_id);
    }
    builder.push(ITEM_GROUP_BY);
    builder.push(" ORDER BY d.created_at DESC");

    let items = builder
        .build_query_as::<DiscoveryItem>()
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Fetch one item.
///
/// # Errors
///
/// Returns `NotFound` if no row matches.
pub async fn get_item(pool: &PgPool, id: Uuid) -> Result<DiscoveryItem, DiscoveryError> {
    let mut builder = QueryBuilder::new(ITEM_SELECT);
    builder.push(" AND d.id = ").push_bind(id);
    builder.push(ITEM_GROUP_BY);

    builder
        .build_query_as::<DiscoveryItem>()
        .fetch_optional(pool)
        .await?
        .ok_or(DiscoveryError::NotFound(id))
}

/// Featured items for the homepage preview, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_featured(pool: &PgPool, limit: i64) -> Result<Vec<DiscoveryItem>, DiscoveryError> {
    let mut builder = QueryBuilder::new(ITEM_SELECT);
    builder.push(" AND d.is_featured = TRUE");
    builder.push(ITEM_GROUP_BY);
    builder.push(" ORDER BY d.created_at DESC LIMIT ").push_bind(limit.max(0));

    Ok(builder
        .build_query_as::<DiscoveryItem>()
        .fetch_all(pool)
        .await?)
}

/// Event-type items whose date has not passed, soonest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_upcoming_events(pool: &PgPool, limit: i64) -> Result<Vec<DiscoveryItem>, DiscoveryError> {
    let mut builder = QueryBuilder::new(ITEM_SELECT);
    builder
        .push(" AND d.type = ")
        .push_bind(DiscoveryItemType::Event);
    builder.push(" AND d.event_date >= now()");
    builder.push(ITEM_GROUP_BY);
    builder.push(" ORDER BY d.event_date ASC LIMIT ").push_bind(limit.max(0));

    Ok(builder
        .build_query_as::<DiscoveryItem>()
        .fetch_all(pool)
        .await?)
}

/// List categories by name, optionally for one item type.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_categories(
    pool: &PgPool,
    item_type: Option<DiscoveryItemType>,
) -> Result<Vec<Category>, DiscoveryError> {
    let mut builder = QueryBuilder::new("SELECT id, name, type, description FROM categories WHERE TRUE");
    if let Some(item_type) = item_type {
        builder.push(" AND type = ").push_bind(item_type);
    }
    builder.push(" ORDER BY name ASC");

    Ok(builder
        .build_query_as::<Category>()
        .fetch_all(pool)
        .await?)
}

// =============================================================================
// WRITES
// =============================================================================

/// Insert one item and return its id.
///
/// # Errors
///
/// Returns a database error if the insert is rejected.
pub async fn insert_item(pool: &PgPool, item: &NewDiscoveryItem, created_by: Uuid) -> Result<Uuid, DiscoveryError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r"INSERT INTO discovery_items
              (name, description, type, category_id, address, event_date, event_time,
               image_url, logo_url, tags, contact_info, is_featured, created_by)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
          RETURNING id",
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.item_type)
    .bind(item.category_id)
    .bind(&item.address)
    .bind(item.event_date)
    .bind(&item.event_time)
    .bind(&item.image_url)
    .bind(&item.logo_url)
    .bind(&item.tags)
    .bind(&item.contact_info)
    .bind(item.is_featured)
    .bind(created_by)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Create an item from the admin form and return it with derived fields.
///
/// # Errors
///
/// Returns a database error if the insert or re-read fails.
pub async fn create_item(
    pool: &PgPool,
    item: &NewDiscoveryItem,
    created_by: Uuid,
) -> Result<DiscoveryItem, DiscoveryError> {
    let id = insert_item(pool, item, created_by).await?;
    tracing::info!(%id, %created_by, item_type = item.item_type.as_str(), "discovery item created");
    get_item(pool, id).await
}

/// Replace every editable field of an item.
///
/// # Errors
///
/// Returns `NotFound` if the item does not exist.
pub async fn update_item(pool: &PgPool, id: Uuid, item: &NewDiscoveryItem) -> Result<DiscoveryItem, DiscoveryError> {
    let result = sqlx::query(
        r"UPDATE discovery_items SET
              name = $2, description = $3, type = $4, category_id = $5, address = $6,
              event_date = $7, event_time = $8, image_url = $9, logo_url = $10,
              tags = $11, contact_info = $12, is_featured = $13, updated_at = now()
          WHERE id = $1",
    )
    .bind(id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.item_type)
    .bind(item.category_id)
    .bind(&item.address)
    .bind(item.event_date)
    .bind(&item.event_time)
    .bind(&item.image_url)
    .bind(&item.logo_url)
    .bind(&item.tags)
    .bind(&item.contact_info)
    .bind(item.is_featured)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DiscoveryError::NotFound(id));
    }
    get_item(pool, id).await
}

/// Delete an item by id. Its reviews go with it (FK cascade).
///
/// # Errors
///
/// Returns `NotFound` if nothing was deleted.
pub async fn delete_item(pool: &PgPool, id: Uuid) -> Result<(), DiscoveryError> {
    let result = sqlx::query("DELETE FROM discovery_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DiscoveryError::NotFound(id));
    }
    tracing::info!(%id, "discovery item deleted");
    Ok(())
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
