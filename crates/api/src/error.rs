use std::error::Error as StdError;

use thiserror::Error;

/// Errors surfaced by the API client and the session layer.
///
/// Variants carry owned strings so a single refresh outcome can be handed to
/// every request parked behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Unauthorized (401): the session is no longer valid")]
    Unauthorized,
    #[error("session refresh failed: {0}")]
    RefreshFailed(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        let detail = error_chain(&error);
        if error.is_timeout() {
            Self::Transport(format!("request timed out: {detail}"))
        } else {
            Self::Transport(detail)
        }
    }
}

/// `error` followed by each of its sources, joined with `": "`. A cause whose
/// text the message already contains is skipped.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl ApiError {
    /// True for errors that mean the user must sign in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::RefreshFailed(_))
    }
}
