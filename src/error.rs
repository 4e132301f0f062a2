// src/error.rs

//! Unified error handling for the crawler.
//!
//! Two layers live here. [`AppError`] is the crate-level error returned
//! through [`Result`]. [`ErrorKind`] is the per-page failure recorded inside a
//! `PageRecord`; it never aborts a crawl.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built or a request failed outside a crawl
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Pattern in the technology signature table failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Crawl request rejected before any fetch
    #[error("Invalid crawl request: {}", .0.join("; "))]
    InvalidRequest(Vec<String>),

    /// Cache store failure
    #[error("Cache error for {key}: {message}")]
    Cache { key: String, message: String },
}

impl AppError {
    /// Create a pattern compilation error.
    pub fn pattern(pattern: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a cache error with the offending key.
    pub fn cache(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Cache {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// Why a single page could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection, DNS, TLS or body read failure
    NetworkFailure,
    /// The per-fetch timeout elapsed
    Timeout,
    /// The server answered with a non-2xx status
    NonSuccessStatus,
    /// robots.txt forbids the URL for our user agent
    RobotsDisallowed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NonSuccessStatus => "non_success_status",
            ErrorKind::RobotsDisallowed => "robots_disallowed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_lists_every_problem() {
        let err = AppError::InvalidRequest(vec![
            "max_pages must be >= 1".to_string(),
            "timeout_secs must be <= 300".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid crawl request: max_pages must be >= 1; timeout_secs must be <= 300"
        );
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::RobotsDisallowed).unwrap();
        assert_eq!(json, "\"robots_disallowed\"");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
    }
}
