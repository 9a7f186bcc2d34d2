//! HTTP error envelope shared by every route.
//!
//! DESIGN
//! ======
//! Services define their own `thiserror` enums and implement [`ErrorCode`].
//! Routes convert them into [`ApiError`], which renders
//! `{"error": code, "message": text}`. Server-side failures are logged here
//! and their detail is replaced with a generic message so SQL never leaks.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

const INTERNAL_MESSAGE: &str = "internal error, please try again later";

/// Grepable error code plus the HTTP status it maps to.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn status(&self) -> StatusCode;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "E_BAD_REQUEST", message)
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "E_UNAUTHORIZED", "sign in required")
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "E_FORBIDDEN", "admin access required")
    }
}

impl<E: ErrorCode> From<E> for ApiError {
    fn from(err: E) -> Self {
        let status = err.status();
        let code = err.error_code();
        if status.is_server_error() {
            tracing::error!(code, error = %err, "request failed");
            return Self::new(status, code, INTERNAL_MESSAGE);
        }
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.code, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Whether a database error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

/// Whether a database error is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_foreign_key_violation)
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
