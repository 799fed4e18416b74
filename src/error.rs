//! Error types for the Pulse client

use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-2xx response other than an unrecoverable 401.
    /// `message` is the server's `message`/`detail` field when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The refresh call was rejected, failed in transit, or was superseded
    /// by a logout while in flight.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// A request stayed unauthorized after the single refresh-and-retry.
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Builds an [`ClientError::Api`] from a status and a response body.
    ///
    /// The message is taken from the body's `message` field, then `detail`,
    /// falling back to `Request failed with status N`.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                ["message", "detail"].iter().find_map(|field| {
                    json.get(*field)
                        .and_then(|v| v.as_str())
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// True for errors that should send the user back to the login view.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::SessionExpired | ClientError::RefreshFailed(_))
    }

    /// True for 5xx responses, which the UI shows as a generic failure.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status >= 500)
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::HttpRequest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field_preferred() {
        let err = ClientError::from_response_body(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Team name already taken", "detail": "ignored"}"#,
        );
        assert_eq!(err.to_string(), "Team name already taken");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_detail_field_fallback() {
        let err = ClientError::from_response_body(
            StatusCode::FORBIDDEN,
            r#"{"detail": "You do not have permission to perform this action."}"#,
        );
        assert_eq!(
            err.to_string(),
            "You do not have permission to perform this action."
        );
    }

    #[test]
    fn test_generic_message_for_unparseable_body() {
        let err = ClientError::from_response_body(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(err.to_string(), "Request failed with status 502");
        assert!(err.is_server_error());

        let err = ClientError::from_response_body(StatusCode::NOT_FOUND, r#"{"errors": []}"#);
        assert_eq!(err.to_string(), "Request failed with status 404");
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(ClientError::SessionExpired.is_auth_failure());
        assert!(ClientError::RefreshFailed("expired cookie".into()).is_auth_failure());
        assert!(!ClientError::Api {
            status: 400,
            message: "bad".into()
        }
        .is_auth_failure());
    }
}
