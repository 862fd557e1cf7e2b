// Handles backend location and endpoint URL construction

use std::time::Duration;

use reqwest::Url;

use crate::error::ApiError;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "KALAM_API_URL";
/// Environment variable overriding the export stagger step, in milliseconds.
pub const EXPORT_STAGGER_ENV: &str = "KALAM_EXPORT_STAGGER_MS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const API_PREFIX: &str = "/api/v1";
pub const DEFAULT_EXPORT_STAGGER: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Builds a config for an explicit base URL.
    ///
    /// Fails with [`ApiError::Setup`] when the URL is not absolute http(s).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&base_url)
            .map_err(|e| ApiError::Setup(format!("invalid base URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Setup(format!(
                "unsupported scheme {:?} in base URL {base_url:?}",
                parsed.scheme()
            )));
        }

        Ok(Self { base_url })
    }

    /// Resolves the base URL from `KALAM_API_URL`, falling back to the loopback default.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::resolve(std::env::var(API_URL_ENV).ok())
    }

    /// Unset or blank resolves to [`DEFAULT_BASE_URL`].
    pub fn resolve(value: Option<String>) -> Result<Self, ApiError> {
        match value {
            Some(value) if !value.trim().is_empty() => Self::new(value),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for a path under the versioned API prefix, e.g. `/handwriting/styles`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// URL for the unversioned service root.
    pub fn root(&self) -> String {
        format!("{}/", self.base_url)
    }
}

/// Stagger step between consecutive page exports.
pub fn export_stagger_from_env() -> Duration {
    resolve_export_stagger(std::env::var(EXPORT_STAGGER_ENV).ok())
}

/// Milliseconds as text; anything unparsable falls back to [`DEFAULT_EXPORT_STAGGER`].
pub fn resolve_export_stagger(value: Option<String>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(DEFAULT_EXPORT_STAGGER, Duration::from_millis)
}
