// Handles the failure taxonomy shared by transport, generation and export

use std::fmt;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Failure of a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be built or sent (bad configuration, bad URL).
    #[error("request setup failed: {0}")]
    Setup(String),

    /// The request left the client but no response came back.
    #[error("backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with an error; `detail` is its own message.
    #[error("{detail}")]
    Application { status: StatusCode, detail: String },

    /// The backend answered successfully but the payload is unusable.
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Setup(_) => FailureKind::Setup,
            ApiError::Transport(_) => FailureKind::Transport,
            ApiError::Application { .. } => FailureKind::Application,
            ApiError::InvalidResponse(_) => FailureKind::InvalidResponse,
        }
    }

    /// Builds an application failure from an error response body.
    ///
    /// FastAPI reports errors as `{"detail": "..."}` or, for validation
    /// errors, `{"detail": [{"msg": "..."}, ...]}`.
    pub fn from_error_body(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| detail_message(&json))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
            });

        ApiError::Application { status, detail }
    }
}

fn detail_message(json: &Value) -> Option<String> {
    match json.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Setup(err.to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

/// Category of a generation failure, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Setup,
    Transport,
    Application,
    InvalidResponse,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Setup => write!(f, "setup"),
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Application => write!(f, "application"),
            FailureKind::InvalidResponse => write!(f, "invalid_response"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Cloneable projection of a failed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl GenerationFailure {
    pub fn cancelled() -> Self {
        Self {
            kind: FailureKind::Cancelled,
            message: "Generation cancelled".to_string(),
        }
    }
}

impl From<ApiError> for GenerationFailure {
    fn from(err: ApiError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Failure to export a single page.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("page has no markup")]
    EmptyMarkup,

    #[error("page content is not an SVG document")]
    NotMarkup,

    #[error("failed to write {filename}: {source}")]
    Io {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_becomes_the_message() {
        let err = ApiError::from_error_body(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"detail": "rate limit exceeded"}"#,
        );
        assert_eq!(err.to_string(), "rate limit exceeded");
        assert_eq!(err.kind(), FailureKind::Application);
    }

    #[test]
    fn validation_details_are_joined() {
        let body = r#"{"detail": [{"loc": ["body", "text"], "msg": "field required"}, {"msg": "value is not a valid integer"}]}"#;
        let err = ApiError::from_error_body(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err.to_string(),
            "field required; value is not a valid integer"
        );
    }

    #[test]
    fn missing_detail_falls_back_to_status_reason() {
        let err = ApiError::from_error_body(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn failure_keeps_kind_and_message() {
        let failure = GenerationFailure::from(ApiError::InvalidResponse("bad".into()));
        assert_eq!(failure.kind, FailureKind::InvalidResponse);
        assert_eq!(failure.message, "invalid response from backend: bad");
    }
}
