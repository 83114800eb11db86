//! Error types for alertsync

use thiserror::Error;

/// Result type alias using alertsync's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for alertsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Dashboard API rejected the request
    #[error("Dashboard API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid interactive selection
    #[error("Invalid selection: {0}")]
    Selection(String),

    /// Terminal prompt error
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a selection error
    pub fn selection(msg: impl Into<String>) -> Self {
        Self::Selection(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create an API error from a status code and error body message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
