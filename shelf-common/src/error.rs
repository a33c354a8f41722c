//! Common error types for Shelf

use thiserror::Error;

/// Common result type for Shelf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Shelf microservices
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed required parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream source answered with a failure (or kept rate limiting us)
    #[error("Upstream error from {source_name}: {message}")]
    Upstream {
        source_name: String,
        /// HTTP status when the upstream answered at all
        status: Option<u16>,
        message: String,
    },

    /// Upstream call exceeded its hard timeout
    #[error("Timeout calling {source_name}: {url}")]
    Timeout { source_name: String, url: String },

    /// Cache backend failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an upstream error without an HTTP status (network, decode)
    pub fn upstream(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Upstream {
            source_name: source_name.into(),
            status: None,
            message: message.into(),
        }
    }

    /// True for upstream failures and timeouts
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. } | Error::Timeout { .. })
    }
}
