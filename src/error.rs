//! Error types for iocscout

use std::time::Duration;
use thiserror::Error;

/// Result type alias for iocscout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Errors raised by a key-value storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Storage database error: {0}")]
    Database(String),

    #[error("Stored value could not be serialized: {0}")]
    Serialization(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Cache-level errors surfaced to callers.
///
/// Only settings persistence reports these; every other cache operation
/// degrades to a miss or a no-op.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Retention must be between 1 and 365 days (got {0})")]
    InvalidRetention(u32),

    #[error("Failed to save cache settings: {0}")]
    SaveSettings(#[source] StoreError),
}

/// Threat-intel provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider {provider} does not support {indicator_type} indicators")]
    Unsupported {
        provider: String,
        indicator_type: String,
    },

    #[error("Provider {0} rate limit exceeded. Retry after {1:?}")]
    RateLimit(String, Duration),

    #[error("Provider {0} returned an error: {1}")]
    Upstream(String, String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
