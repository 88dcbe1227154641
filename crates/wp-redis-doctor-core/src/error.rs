//! Error types for the diagnostic library.

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the diagnostic library.
#[derive(Error, Debug)]
pub enum Error {
    /// The WordPress host environment could not be reached
    #[error("This tool must be run against a WordPress installation via WP-CLI.")]
    HostUnavailable,

    /// Host (WP-CLI) invocation error
    #[error("Host error: {0}")]
    Host(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache client error
    #[error("{0}")]
    Cache(#[from] CacheError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error came from establishing the cache connection.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Error::Cache(CacheError::ConnectFailed { .. } | CacheError::Timeout { .. })
        )
    }
}

/// Cache-specific errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CacheError {
    /// Connection could not be established
    #[error("Failed to connect to {endpoint}: {message}")]
    ConnectFailed { endpoint: String, message: String },

    /// Connection attempt exceeded its deadline
    #[error("Connection to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// Command failed on an established connection
    #[error("{0}")]
    Command(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Command(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Cache(err.into())
    }
}
