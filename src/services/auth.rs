//! Delegated identity: resolve provider access tokens to users.
//!
//! ARCHITECTURE
//! ============
//! Sign-in, refresh and sign-out all happen between the browser and the auth
//! provider. This service only asks the provider who a bearer token belongs
//! to, then reads the local `profiles.role` to decide admin access.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::ErrorCode;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth provider not configured")]
    NotConfigured,
    #[error("invalid or expired access token")]
    InvalidToken,
    #[error("auth provider error: {0}")]
    Provider(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_AUTH_UNAVAILABLE",
            Self::InvalidToken => "E_UNAUTHORIZED",
            Self::Provider(_) => "E_AUTH_PROVIDER",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// User payload returned by the provider's user endpoint (subset).
#[derive(Debug, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    /// Role from `profiles`, `None` when the user has no profile row.
    pub role: Option<String>,
}

impl SessionUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// Ask the provider which user owns `access_token`.
///
/// # Errors
///
/// `InvalidToken` when the provider rejects the token, `Provider` for any
/// transport or decoding failure.
pub async fn fetch_provider_user(
    client: &reqwest::Client,
    config: &AuthConfig,
    access_token: &str,
) -> Result<ProviderUser, AuthError> {
    let resp = client
        .get(config.user_endpoint())
        .header("apikey", &config.api_key)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AuthError::Provider(e.to_string()))?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(AuthError::InvalidToken);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Provider(format!("{status}: {body}")));
    }

    resp.json::<ProviderUser>()
        .await
        .map_err(|e| AuthError::Provider(e.to_string()))
}

/// Look up the user's role in `profiles`.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn load_role(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, AuthError> {
    let role = sqlx::query_scalar::<_, Option<String>>("SELECT role FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .flatten();
    Ok(role)
}

/// Resolve a token to a full [`SessionUser`].
///
/// # Errors
///
/// Propagates provider and database failures.
pub async fn resolve_session_user(
    pool: &PgPool,
    client: &reqwest::Client,
    config: Option<&AuthConfig>,
    access_token: &str,
) -> Result<SessionUser, AuthError> {
    let config = config.ok_or(AuthError::NotConfigured)?;
    let provider_user = fetch_provider_user(client, config, access_token).await?;
    let role = load_role(pool, provider_user.id).await?;
    Ok(SessionUser { id: provider_user.id, email: provider_user.email, role })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
