//! Site settings and the homepage banner.
//!
//! Settings are keyed JSON documents in `site_settings`. Writes replace the
//! whole value for a key (`INSERT .. ON CONFLICT DO UPDATE`); there is no
//! merge and no version check, so the last writer wins.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{Map, Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ErrorCode;

pub const BANNER_KEY: &str = "homepage_banner";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("setting value must be a JSON object")]
    NotAnObject,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "E_INVALID_SETTING",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotAnObject => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// STORE SEAM
// =============================================================================

/// Keyed JSON storage. `PgPool` reads and writes `site_settings`.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Option<Value>, SettingsError>;
    async fn upsert(&self, key: &str, value: &Value, updated_by: Uuid) -> Result<(), SettingsError>;
}

#[async_trait]
impl SettingsStore for PgPool {
    async fn fetch(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        let value = sqlx::query_scalar::<_, Option<Value>>("SELECT value FROM site_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(self)
            .await?;
        Ok(value.flatten())
    }

    async fn upsert(&self, key: &str, value: &Value, updated_by: Uuid) -> Result<(), SettingsError> {
        sqlx::query(
            r"INSERT INTO site_settings (key, value, updated_by)
              VALUES ($1, $2, $3)
              ON CONFLICT (key) DO UPDATE
              SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .execute(self)
        .await?;
        Ok(())
    }
}

/// Stored value for `key`, or `None` when the row or its value is absent.
///
/// # Errors
///
/// Propagates store failures.
pub async fn get_setting(store: &dyn SettingsStore, key: &str) -> Result<Option<Value>, SettingsError> {
    store.fetch(key).await
}

/// Replace the value for `key`.
///
/// # Errors
///
/// Propagates store failures.
pub async fn upsert_setting(
    store: &dyn SettingsStore,
    key: &str,
    value: &Value,
    updated_by: Uuid,
) -> Result<(), SettingsError> {
    store.upsert(key, value, updated_by).await?;
    tracing::info!(key, %updated_by, "site setting saved");
    Ok(())
}

// =============================================================================
// HOMEPAGE BANNER
// =============================================================================

/// Built-in banner: three slides, each with a title, description, two
/// buttons and an image, stored as flat `slide{n}_*` keys.
#[must_use]
pub fn default_banner() -> Map<String, Value> {
    let value = json!({
        "slide1_title": "Bringing Communities Together",
        "slide1_description": "Mateng Hub Connect is revolutionizing hyperlocal delivery with innovative solutions across four powerful verticals. Established in December 2022, we're building the future of community commerce.",
        "slide1_button1_text": "Our Services",
        "slide1_button1_link": "/services",
        "slide1_button2_text": "Learn More",
        "slide1_button2_link": "/about",
        "slide1_image_url": "https://images.unsplash.com/photo-1528605248644-14dd04022da1?auto=format&fit=crop&w=1000",
        "slide2_title": "Shop Local, Support Local",
        "slide2_description": "Our marketplace connects local producers, artisans and small businesses directly with customers in your community. Discover unique products while supporting the local economy.",
        "slide2_button1_text": "Shop Now",
        "slide2_button1_link": "/marketplace",
        "slide2_button2_text": "How It Works",
        "slide2_button2_link": "/marketplace#how-it-works",
        "slide2_image_url": "https://images.unsplash.com/photo-1534723452862-4c874018d66d?auto=format&fit=crop&w=1000",
        "slide3_title": "June 2025 Education Competition",
        "slide3_description": "Join our exciting education-focused community competition with amazing prizes and opportunities to showcase your talents. Open for students of class 4, 5, 6 and 11, 12.",
        "slide3_button1_text": "Register Now",
        "slide3_button1_link": "/competition",
        "slide3_button2_text": "Browse Programs",
        "slide3_button2_link": "/education",
        "slide3_image_url": "https://images.unsplash.com/photo-1605810230434-7631ac76ec81?auto=format&fit=crop&w=1000",
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Overlay a stored banner on the defaults. Non-object values are ignored.
#[must_use]
pub fn banner_with_defaults(stored: Option<Value>) -> Map<String, Value> {
    let mut banner = default_banner();
    if let Some(Value::Object(stored)) = stored {
        banner.extend(stored);
    }
    banner
}

/// Current banner as the homepage renders it.
///
/// # Errors
///
/// Propagates store failures.
pub async fn load_banner(store: &dyn SettingsStore) -> Result<Map<String, Value>, SettingsError> {
    let stored = get_setting(store, BANNER_KEY).await?;
    Ok(banner_with_defaults(stored))
}

/// Save the banner wholesale under [`BANNER_KEY`].
///
/// # Errors
///
/// `NotAnObject` when `value` is not a JSON object; store failures otherwise.
pub async fn save_banner(store: &dyn SettingsStore, value: &Value, updated_by: Uuid) -> Result<(), SettingsError> {
    if !value.is_object() {
        return Err(SettingsError::NotAnObject);
    }
    upsert_setting(store, BANNER_KEY, value, updated_by).await
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
