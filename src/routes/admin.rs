//! Back-office routes. Every handler takes [`AdminUser`].

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::auth::AdminUser;
use crate::routes::reviews::ConfirmQuery;
use crate::services::discovery::{self, DiscoveryItem, DiscoveryItemForm, ItemFilter};
use crate::services::events::{self, Event, Registration};
use crate::services::import::{self, ImportReport};
use crate::services::settings;
use crate::state::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

// =============================================================================
// DISCOVERY ITEMS
// =============================================================================

/// `POST /api/admin/discovery`
pub async fn create_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(form): Json<DiscoveryItemForm>,
) -> Result<(StatusCode, Json<DiscoveryItem>), ApiError> {
    let item = form.into_new_item()?;
    let created = discovery::create_item(&state.pool, &item, admin.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/admin/discovery/{id}`
pub async fn update_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(form): Json<DiscoveryItemForm>,
) -> Result<Json<DiscoveryItem>, ApiError> {
    let item = form.into_new_item()?;
    let updated = discovery::update_item(&state.pool, id, &item).await?;
    tracing::info!(%id, admin_id = %admin.id, "discovery item updated");
    Ok(Json(updated))
}

/// `DELETE /api/admin/discovery/{id}?confirm=true`
pub async fn delete_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ConfirmQuery>,
) -> Result<StatusCode, ApiError> {
    if !query.confirm {
        return Err(ApiError::bad_request("deleting an item must be confirmed with confirm=true"));
    }
    discovery::delete_item(&state.pool, id).await?;
    tracing::info!(%id, admin_id = %admin.id, "discovery item removed by admin");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// CSV IMPORT / EXPORT
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ImportCsvBody {
    pub csv: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub report: ImportReport,
    pub message: String,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        let message = report.summary();
        Self { report, message }
    }
}

/// Accept either `{"csv": "..."}` or the raw file as the request body.
fn csv_text(headers: &HeaderMap, body: String) -> Result<String, ApiError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json {
        return Ok(body);
    }
    serde_json::from_str::<ImportCsvBody>(&body)
        .map(|b| b.csv)
        .map_err(|e| ApiError::bad_request(format!("invalid import body: {e}")))
}

/// `POST /api/admin/discovery/import`
pub async fn import_csv(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let text = csv_text(&headers, body)?;
    let report = import::import_csv(&state.pool, &text, admin.id).await?;
    Ok(Json(report.into()))
}

fn csv_attachment(filename: &str, body: Body) -> Response {
    (
        [
            (CONTENT_TYPE, CSV_CONTENT_TYPE.to_owned()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}

/// `GET /api/admin/discovery/template.csv`
pub async fn template(AdminUser(_admin): AdminUser) -> Response {
    csv_attachment(import::TEMPLATE_FILENAME, Body::from(import::template_csv()))
}

/// `GET /api/admin/discovery/export.csv`
pub async fn export_csv(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Response, ApiError> {
    let items = discovery::list_items(&state.pool, ItemFilter::default()).await?;
    tracing::info!(admin_id = %admin.id, count = items.len(), "exporting discovery items");

    let lossy_ids: Vec<Uuid> = items
        .iter()
        .filter(|item| !import::reimports_cleanly(item))
        .map(|item| item.id)
        .collect();
    if !lossy_ids.is_empty() {
        tracing::warn!(count = lossy_ids.len(), ids = ?lossy_ids, "exported items contain separators and will not re-import");
    }

    let csv = import::export_csv(&items)?;
    Ok(csv_attachment(import::EXPORT_FILENAME, Body::from(csv)))
}

// =============================================================================
// SETTINGS / EVENTS
// =============================================================================

/// `GET /api/admin/settings/banner`
pub async fn get_banner(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Map<String, Value>>, ApiError> {
    Ok(Json(settings::load_banner(&state.pool).await?))
}

/// `PUT /api/admin/settings/banner`. The body replaces the stored banner.
pub async fn save_banner(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(value): Json<Value>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    settings::save_banner(&state.pool, &value, admin.id).await?;
    Ok(Json(settings::banner_with_defaults(Some(value))))
}

/// `GET /api/admin/events`
pub async fn list_events(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(events::list_events(&state.pool).await?))
}

/// `GET /api/admin/registrations`
pub async fn list_registrations(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Registration>>, ApiError> {
    Ok(Json(events::list_registrations(&state.pool).await?))
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
