//! Client error types.

use openai_model::WireError;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response JSON did not match the expected model, or list parameters
    /// were out of bounds.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error category, e.g. `invalid_request_error`.
        error_type: Option<String>,
        /// Machine-readable code, e.g. `rate_limit_exceeded`.
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// Credentials were missing or rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// The underlying wire error, if decoding or validation failed.
    pub fn as_wire(&self) -> Option<&WireError> {
        match self {
            Error::Wire(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error envelope returned by the API: `{"error": {...}}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// A string on most endpoints, occasionally a number or null.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn code_string(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_codes() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"error": {"message": "slow down", "type": "requests", "code": "rate_limit_exceeded"}}"#,
        )
        .unwrap();
        assert_eq!(body.error.code_string().as_deref(), Some("rate_limit_exceeded"));
        assert_eq!(body.error.error_type.as_deref(), Some("requests"));

        let body: ErrorResponse =
            serde_json::from_str(r#"{"error": {"message": "x", "code": 42}}"#).unwrap();
        assert_eq!(body.error.code_string().as_deref(), Some("42"));

        let body: ErrorResponse =
            serde_json::from_str(r#"{"error": {"message": "x", "type": null, "code": null}}"#)
                .unwrap();
        assert_eq!(body.error.code_string(), None);
        assert_eq!(body.error.error_type, None);
    }

    #[test]
    fn test_predicates() {
        let err = Error::Api {
            status: 503,
            error_type: None,
            code: None,
            message: "overloaded".into(),
        };
        assert!(err.is_server_error());
        assert!(!err.is_rate_limited());
        assert!(Error::NotFound("vs_1".into()).is_not_found());

        let err = Error::from(WireError::invalid_page_parameter("limit", "too big"));
        assert!(err.as_wire().is_some());
    }
}
