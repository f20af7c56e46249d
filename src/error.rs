//! Error types for the avatar gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the avatar gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Client input error (missing or empty message)
    #[error("invalid input: {0}")]
    Input(String),

    /// Language-model call error
    #[error("model error: {0}")]
    Model(String),

    /// Speech-synthesis error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Audio decode error
    #[error("audio error: {0}")]
    Audio(String),

    /// Object storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Push notification error
    #[error("publish error: {0}")]
    Publish(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
