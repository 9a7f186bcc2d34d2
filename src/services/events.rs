//! Community events and event registrations.
//!
//! Events are curated directly in the database and only read here.
//! Registrations are fire-and-forget inserts: one row per submission, no
//! duplicate detection, no capacity check.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::is_foreign_key_violation;
use crate::services::forms::{FormError, Required, optional};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub event_date: OffsetDateTime,
    pub location: String,
    pub image_url: Option<String>,
    pub is_featured: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub user_id: Option<Uuid>,
    pub additional_info: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Registration form body as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationInput {
    pub event_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub additional_info: Option<serde_json::Value>,
}

/// Validated registration ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegistration {
    pub event_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub user_id: Option<Uuid>,
    pub additional_info: Option<serde_json::Value>,
}

impl RegistrationInput {
    /// Check required fields and attach the signed-in user, if any.
    ///
    /// # Errors
    ///
    /// `MissingFields` listing every blank required field, or `Invalid`
    /// when `event_id` is not a UUID.
    pub fn validate(self, user_id: Option<Uuid>) -> Result<NewRegistration, FormError> {
        let mut required = Required::default();
        let event_id = required.field("event_id", self.event_id.as_deref());
        let full_name = required.field("full_name", self.full_name.as_deref());
        let email = required.field("email", self.email.as_deref());
        required.finish()?;

        let event_id =
            Uuid::parse_str(event_id).map_err(|_| FormError::Invalid(format!("invalid event id: {event_id}")))?;

        Ok(NewRegistration {
            event_id,
            full_name: full_name.to_owned(),
            email: email.to_owned(),
            phone: optional(self.phone.as_deref()),
            organization: optional(self.organization.as_deref()),
            user_id,
            additional_info: self.additional_info,
        })
    }
}

const EVENT_COLUMNS: &str = "id, title, description, event_date, location, image_url, is_featured, created_at";

/// All events, latest event date first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_events(pool: &PgPool) -> Result<Vec<Event>, FormError> {
    let events = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date DESC"))
        .fetch_all(pool)
        .await?;
    Ok(events)
}

/// Featured events, soonest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_featured_events(pool: &PgPool) -> Result<Vec<Event>, FormError> {
    let events = sqlx::query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE is_featured ORDER BY event_date ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// Validate and store one registration.
///
/// # Errors
///
/// Validation errors from [`RegistrationInput::validate`]; `NotFound` when
/// the event does not exist.
pub async fn submit_registration(
    pool: &PgPool,
    input: RegistrationInput,
    user_id: Option<Uuid>,
) -> Result<Uuid, FormError> {
    let reg = input.validate(user_id)?;

    let id = sqlx::query_scalar::<_, Uuid>(
        r"INSERT INTO registrations (event_id, full_name, email, phone, organization, user_id, additional_info)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          RETURNING id",
    )
    .bind(reg.event_id)
    .bind(&reg.full_name)
    .bind(&reg.email)
    .bind(&reg.phone)
    .bind(&reg.organization)
    .bind(reg.user_id)
    .bind(&reg.additional_info)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            FormError::NotFound(format!("event not found: {}", reg.event_id))
        } else {
            FormError::Database(e)
        }
    })?;

    tracing::info!(registration_id = %id, event_id = %reg.event_id, "registration submitted");
    Ok(id)
}

/// All registrations, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_registrations(pool: &PgPool) -> Result<Vec<Registration>, FormError> {
    let rows = sqlx::query_as::<_, Registration>(
        "SELECT id, event_id, full_name, email, phone, organization, user_id, additional_info, created_at \
         FROM registrations ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
