//! Error type for backend operations.

/// Error type for backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid token: {0}")]
    Token(String),

    #[error("realtime socket error: {0}")]
    Socket(String),

    #[error("no active session")]
    NoSession,

    #[error("no rows returned")]
    NoRows,
}
