//! Error types for the tuner bridge
//!
//! This module defines the error hierarchy for the whole bridge.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The decoder never produces errors: malformed chunks are recovered inside
//! the decoder and only show up as a shorter record list.

use thiserror::Error;

/// The main error type for the tuner bridge
#[derive(Error, Debug)]
pub enum Error {
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

    // ============================================================================
    // Inbound Request Errors
    // ============================================================================
    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Device Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Connection error: {message}")]
    Connection { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification used to pick the inbound response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or missing inbound fields, nothing was sent to the device
    Client,
    /// The device call exceeded the configured timeout
    Timeout,
    /// The device answered with a status other than 200
    Upstream,
    /// The device could not be reached
    Connection,
    /// Anything unexpected
    Internal,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an inbound request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Classify this error for the inbound response
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidRequest { .. } | Error::InvalidUrl(_) | Error::JsonParse(_) => {
                ErrorCategory::Client
            }
            Error::Timeout { .. } => ErrorCategory::Timeout,
            Error::HttpStatus { .. } => ErrorCategory::Upstream,
            Error::Connection { .. } => ErrorCategory::Connection,
            Error::Http(e) if e.is_timeout() => ErrorCategory::Timeout,
            Error::Http(e) if e.is_connect() || e.is_request() || e.is_body() => {
                ErrorCategory::Connection
            }
            _ => ErrorCategory::Internal,
        }
    }

    /// Device status code, when the device answered with a non-200 status
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for the tuner bridge
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
