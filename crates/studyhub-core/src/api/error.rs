use serde::Deserialize;
use thiserror::Error;

use super::messages;
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response at all: DNS, connect, TLS, timeout.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401/403. On an authenticated call the session has already been
    /// cleared by the time the caller sees this.
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other 4xx. `message` is the server's text.
    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// 5xx or a status we do not expect.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape sent by the service. Either field may be missing.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pick the most useful message out of an error body: `message`, then
    /// `error`, then the raw (truncated) text.
    pub(crate) fn message_from_body(body: &str) -> String {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        parsed
            .message
            .filter(|m| !m.is_empty())
            .or(parsed.error.filter(|e| !e.is_empty()))
            .unwrap_or_else(|| Self::truncate_body(body.trim()))
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::message_from_body(body);
        let status = status.as_u16();
        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            400..=499 => ApiError::Validation { status, message },
            _ => ApiError::Server { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Text for the view's error line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => messages::TRANSPORT_FAILURE.to_string(),
            ApiError::Unauthorized { .. } => messages::SESSION_EXPIRED.to_string(),
            ApiError::Validation { message, .. } if message.is_empty() => {
                messages::INVALID_REQUEST.to_string()
            }
            ApiError::Validation { message, .. } => messages::remap_validation_message(message),
            ApiError::Server { .. } => messages::SERVER_FAILURE.to_string(),
            ApiError::InvalidResponse(_) => messages::UNEXPECTED_RESPONSE.to_string(),
            ApiError::Storage(_) => messages::STORAGE_FAILURE.to_string(),
            ApiError::Config(message) => message.clone(),
        }
    }

    /// Like `user_message`, for failures of the login/register forms. A 401
    /// there means bad credentials, not an expired session.
    pub fn auth_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized { .. } => messages::INVALID_CREDENTIALS.to_string(),
            ApiError::Validation { message, .. } if message.is_empty() => fallback.to_string(),
            ApiError::Server { .. } => fallback.to_string(),
            other => other.user_message(),
        }
    }
}
