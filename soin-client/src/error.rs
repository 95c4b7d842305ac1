use thiserror::Error;

/// Errors surfaced by the SOIN client.
#[derive(Error, Debug)]
pub enum SoinError {
    /// Login, registration or token resolution was rejected by the auth
    /// service. Carries the server-provided reason.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The server answered with a non-success status outside the auth flow.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connection refused, timeout, bad TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading or writing the durable credential token failed.
    #[error("token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A submission payload that cannot be sent (e.g. missing image bytes).
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
}

pub type Result<T> = std::result::Result<T, SoinError>;
