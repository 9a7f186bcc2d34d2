//! Public form submissions and lookups: event registration, business
//! inquiry, competition application, admit card, exam result, plus the
//! homepage reads (featured events, banner).

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::auth::MaybeUser;
use crate::services::competition::{self, AdmitCardStatus, ApplicationInput, ExamResult};
use crate::services::events::{self, Event, RegistrationInput};
use crate::services::inquiries::{self, InquiryInput};
use crate::services::settings;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ApplicationSubmitted {
    pub form_no: String,
}

#[derive(Debug, Deserialize)]
pub struct AdmitCardQuery {
    #[serde(default)]
    pub form_no: String,
}

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    #[serde(default)]
    pub roll_number: String,
}

/// Status plus the applicant-facing line that goes with it.
#[derive(Debug, Serialize)]
pub struct AdmitCardResponse {
    #[serde(flatten)]
    pub status: AdmitCardStatus,
    pub message: String,
}

impl From<AdmitCardStatus> for AdmitCardResponse {
    fn from(status: AdmitCardStatus) -> Self {
        let message = status.message();
        Self { status, message }
    }
}

/// `GET /api/events/featured`
pub async fn featured_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(events::list_featured_events(&state.pool).await?))
}

/// `POST /api/registrations`
pub async fn register(
    State(state): State<AppState>,
    user: MaybeUser,
    Json(input): Json<RegistrationInput>,
) -> Result<(StatusCode, Json<Submitted>), ApiError> {
    let id = events::submit_registration(&state.pool, input, user.id()).await?;
    Ok((StatusCode::CREATED, Json(Submitted { id })))
}

/// `POST /api/inquiries`
pub async fn inquire(
    State(state): State<AppState>,
    user: MaybeUser,
    Json(input): Json<InquiryInput>,
) -> Result<(StatusCode, Json<Submitted>), ApiError> {
    let id = inquiries::submit_inquiry(&state.pool, input, user.id()).await?;
    Ok((StatusCode::CREATED, Json(Submitted { id })))
}

/// `POST /api/competition/applications`
pub async fn apply(
    State(state): State<AppState>,
    Json(input): Json<ApplicationInput>,
) -> Result<(StatusCode, Json<ApplicationSubmitted>), ApiError> {
    let form_no = competition::submit_application(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(ApplicationSubmitted { form_no })))
}

/// `GET /api/competition/admit-card?form_no=`
///
/// Every state is a 200; `not_found` is one of the statuses.
pub async fn admit_card(
    State(state): State<AppState>,
    Query(query): Query<AdmitCardQuery>,
) -> Result<Json<AdmitCardResponse>, ApiError> {
    let status = competition::lookup_admit_card(&state.pool, &query.form_no).await?;
    Ok(Json(status.into()))
}

/// `GET /api/competition/result?roll_number=`
pub async fn exam_result(
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<Json<ExamResult>, ApiError> {
    Ok(Json(competition::lookup_result(&state.pool, &query.roll_number).await?))
}

/// `GET /api/settings/banner`
pub async fn banner(State(state): State<AppState>) -> Result<Json<Map<String, Value>>, ApiError> {
    Ok(Json(settings::load_banner(&state.pool).await?))
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
