// ================================================================
// File: livewatch-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network failure, timeout, or non-2xx answer from the provider.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Malformed inbound webhook body. The only failure the hub ever sees.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Channel or video absent upstream.
    #[error("Not found error: {0}")]
    NotFound(String),

    /// Notification addressed to a channel we do not track.
    #[error("Channel mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: String, actual: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    /// A spawned background task panicked or was cancelled.
    #[error("Task error: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}
