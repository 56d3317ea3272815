//! Error types for the chat client.

use thiserror::Error;

/// Client error type.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file or storage I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with a non-success status and a body that was not JSON.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        message: String,
    },

    /// Durable key-value storage is unusable.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The send queue worker is no longer running.
    #[error("Send queue closed")]
    QueueClosed,

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
