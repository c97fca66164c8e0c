use thiserror::Error;

/// Errors surfaced by the listings backend client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, timeout, reset)
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx envelope with `success: false`
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    /// Rejected client-side before any request was sent
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("not signed in")]
    Auth,
}

impl ApiError {
    /// Text suitable for showing to the user next to a refresh control
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) | ApiError::Decode(_) => {
                "Failed to load. Check your connection and try again.".to_string()
            }
            ApiError::Status { message, .. } | ApiError::Rejected(message) => message.clone(),
            ApiError::Invalid(message) => message.clone(),
            ApiError::Auth => "Please sign in to continue.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Errors raised while building a [`crate::config::ClientConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
}
