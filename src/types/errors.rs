//! Error types for cache-helper.

use thiserror::Error;

/// Default result type for cache-helper.
pub type CacheHelperResult<T> = Result<T, CacheHelperError>;

/// Errors that cache-helper can produce.
#[derive(Error, Debug)]
pub enum CacheHelperError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Could not create cache key: {0}")]
    KeyCreation(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("{0}")]
    Other(String),
}

impl CacheHelperError {
    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates a key creation error.
    pub fn key_creation<S: Into<String>>(msg: S) -> Self {
        Self::KeyCreation(msg.into())
    }

    /// Whether the error came from the cache backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
