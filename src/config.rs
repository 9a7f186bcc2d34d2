//! Process configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (when present) and then builds `AppConfig` once. Every
//! knob has a default except `DATABASE_URL`; the auth provider is optional so
//! public pages keep working when it is not configured.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ASSETS_DIR: &str = "./assets";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Connection details for the hosted auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Base URL without trailing slash, e.g. `https://project.example.co`.
    pub base_url: String,
    /// Public API key sent as the `apikey` header.
    pub api_key: String,
    pub timeout: Duration,
}

impl AuthConfig {
    /// Load from `AUTH_URL` and `AUTH_API_KEY`. Returns `None` if either is
    /// missing or blank (authenticated routes are then unavailable).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = non_blank(std::env::var("AUTH_URL").ok())?;
        let api_key = non_blank(std::env::var("AUTH_API_KEY").ok())?;
        let timeout_secs = env_parse("AUTH_TIMEOUT_SECS", DEFAULT_AUTH_TIMEOUT_SECS);
        Some(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// URL of the provider endpoint that resolves an access token to a user.
    #[must_use]
    pub fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub assets_dir: PathBuf,
    pub auth: Option<AuthConfig>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `ASSETS_DIR`: default `./assets`
    /// - `AUTH_URL`, `AUTH_API_KEY`, `AUTH_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or `PORT` is not a port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            non_blank(std::env::var("DATABASE_URL").ok()).ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let assets_dir = std::env::var("ASSETS_DIR").map_or_else(|_| PathBuf::from(DEFAULT_ASSETS_DIR), PathBuf::from);

        Ok(Self {
            database_url,
            port,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            assets_dir,
            auth: AuthConfig::from_env(),
        })
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid { key: "PORT", value: value.to_owned() }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
