//! Auth extractors and `/api/auth/me`.
//!
//! The access token comes from `Authorization: Bearer ..` or, for browser
//! requests, the `access_token` cookie. Tokens are checked against the auth
//! provider on every request; nothing is cached.

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::error::ApiError;
use crate::services::auth::{self as auth_svc, AuthError, SessionUser};
use crate::state::AppState;

pub(crate) const TOKEN_COOKIE_NAME: &str = "access_token";

/// Bearer header first, then the cookie. Blank values count as absent.
pub(crate) fn access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    let jar = CookieJar::from_headers(headers);
    jar.get(TOKEN_COOKIE_NAME)
        .map(Cookie::value)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

async fn resolve(state: &AppState, token: &str) -> Result<SessionUser, AuthError> {
    auth_svc::resolve_session_user(&state.pool, &state.http, state.auth.as_ref(), token).await
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Signed-in caller. Rejects with 401 when no valid token is present.
pub struct AuthUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = access_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let app_state = AppState::from_ref(state);
        let user = resolve(&app_state, &token).await?;
        Ok(Self(user))
    }
}

/// Signed-in caller whose profile role is `admin`; 403 otherwise.
pub struct AdminUser(pub SessionUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "non-admin attempted admin route");
            return Err(ApiError::forbidden());
        }
        Ok(Self(user))
    }
}

/// Optional caller for pages that also render signed out. A missing or
/// rejected token reads as anonymous, as does an unconfigured provider.
pub struct MaybeUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = access_token(&parts.headers) else {
            return Ok(Self(None));
        };
        let app_state = AppState::from_ref(state);
        match resolve(&app_state, &token).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(AuthError::InvalidToken | AuthError::NotConfigured) => Ok(Self(None)),
            Err(e) => Err(e.into()),
        }
    }
}

impl MaybeUser {
    #[must_use]
    pub fn id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|u| u.id)
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/auth/me`: current user with role.
pub async fn me(AuthUser(user): AuthUser) -> Json<SessionUser> {
    Json(user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
