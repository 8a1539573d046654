use reqwest::StatusCode;
use thiserror::Error;

/// Message used when an error body is not JSON at all.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Message used when an error body is JSON but carries no `message` field.
pub const REQUEST_FAILED_MESSAGE: &str = "API request failed";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Request { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Token storage failed: {0}")]
    TokenStore(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Build a request error from a non-2xx status and the raw error body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or(REQUEST_FAILED_MESSAGE)
                .to_string(),
            Err(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        };
        ApiError::Request { status, message }
    }

    /// Human readable text for toasts and prompts.
    pub fn message(&self) -> String {
        match self {
            ApiError::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// True when the backend rejected our credentials; views treat this as logged out.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
