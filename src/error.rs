//! Error types for offset-infinity
//!
//! This module defines the error hierarchy for the crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Failures reported by a [`DataSource`](crate::source::DataSource) are kept
//! in their own [`DataSourceError`] type so callers can tell a failed page
//! apart from a misconfigured cursor.

use thiserror::Error;

/// The main error type for offset-infinity
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Cursor Errors
    // ============================================================================
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this error came from the data source
    pub fn is_data_source(&self) -> bool {
        matches!(self, Self::DataSource(_))
    }

    /// Check if retrying the same page may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DataSource(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Failure surfaced by a data source while fetching a page
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DataSourceError {
    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Wrap an arbitrary failure message
    pub fn other(message: impl std::fmt::Display) -> Self {
        Self::Other(anyhow::anyhow!("{message}"))
    }

    /// Check if this error is transient
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => is_retryable_status(*status),
            Self::Decode { .. } | Self::Other(_) => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for offset-infinity
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
