//! Error types for the review analysis client.

use serde::Deserialize;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Review analysis client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network error (connection refused, DNS failure, interrupted body)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Build an API error from a failed response body.
    ///
    /// The backend reports failures as `{"detail": ...}`. When the body has
    /// that shape the detail becomes the message; otherwise a generic
    /// status-code message is used.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = detail_from_body(body)
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        Self::Api { status, message }
    }

    /// HTTP status of a backend-reported failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message to show the user: the backend detail when present, else the
    /// transport error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Network(e) => e.to_string(),
            Self::Parse(msg) => msg.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

// Validation failures carry a list of objects in `detail` rather than a string.
fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
