//! Public discovery directory routes.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::discovery::{
    self, Category, DEFAULT_PREVIEW_LIMIT, DiscoveryItem, DiscoveryItemType, ItemFilter,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub category_id: Option<Uuid>,
}

impl ListQuery {
    fn into_filter(self) -> Result<ItemFilter, ApiError> {
        Ok(ItemFilter {
            item_type: DiscoveryItemType::parse_filter(self.item_type.as_deref())?,
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PREVIEW_LIMIT).clamp(1, 100)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

/// `GET /api/discovery?type=&category_id=`
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DiscoveryItem>>, ApiError> {
    let filter = query.into_filter()?;
    Ok(Json(discovery::list_items(&state.pool, filter).await?))
}

/// `GET /api/discovery/{id}`
pub async fn get_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<DiscoveryItem>, ApiError> {
    Ok(Json(discovery::get_item(&state.pool, id).await?))
}

/// `GET /api/discovery/featured?limit=`
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<DiscoveryItem>>, ApiError> {
    Ok(Json(discovery::list_featured(&state.pool, query.limit()).await?))
}

/// `GET /api/discovery/upcoming?limit=`
pub async fn upcoming_events(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<DiscoveryItem>>, ApiError> {
    Ok(Json(discovery::list_upcoming_events(&state.pool, query.limit()).await?))
}

/// `GET /api/categories?type=`
pub async fn categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let item_type = DiscoveryItemType::parse_filter(query.item_type.as_deref())?;
    Ok(Json(discovery::list_categories(&state.pool, item_type).await?))
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
