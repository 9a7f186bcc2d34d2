//! Shared validation for the public submission forms.

use axum::http::StatusCode;

use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("please fill out all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for FormError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "E_MISSING_FIELDS",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Trimmed value, `None` when absent or blank.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Collects the names of blank required fields in declaration order.
#[derive(Debug, Default)]
pub(crate) struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    /// Record `name` as missing when `value` is blank; hands back the trimmed value.
    pub(crate) fn field<'a>(&mut self, name: &'static str, value: Option<&'a str>) -> &'a str {
        match present(value) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                ""
            }
        }
    }

    pub(crate) fn finish(self) -> Result<(), FormError> {
        if self.missing.is_empty() { Ok(()) } else { Err(FormError::MissingFields(self.missing)) }
    }
}

/// Owned trimmed copy of an optional field.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    present(value).map(str::to_owned)
}
