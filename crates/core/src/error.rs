//! Error types for llms.txt operations.
//!
//! This module defines the main error type [`LlmsTxtError`] which represents
//! every failure a pipeline stage, the configuration loader, or the fetcher
//! can report. The machine-view entry point itself never returns one: it maps
//! stage failures to fallbacks before they reach a caller.
//!
//! # Example
//!
//! ```rust
//! use llms_txt_core::{LlmsTxtError, Result};
//!
//! fn require_selector(selector: &str) -> Result<&str> {
//!     if selector.trim().is_empty() {
//!         return Err(LlmsTxtError::HtmlParseError("empty selector".to_string()));
//!     }
//!     Ok(selector)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for llms.txt operations.
#[derive(Error, Debug)]
pub enum LlmsTxtError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors.
    ///
    /// Returned when HTML cannot be parsed or a CSS selector is invalid.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The HTML to Markdown capability failed.
    #[error("Markdown conversion failed: {0}")]
    ConversionError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File and stdin read or write errors.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors.
    ///
    /// Returned when a configuration file or environment override is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Unknown machine-view trigger mode.
    #[error("Invalid trigger mode: {0} (expected query, accept, header or all)")]
    InvalidTrigger(String),
}

impl From<serde_json::Error> for LlmsTxtError {
    fn from(err: serde_json::Error) -> Self {
        LlmsTxtError::ConfigError(err.to_string())
    }
}

/// Result type alias for LlmsTxtError.
pub type Result<T> = std::result::Result<T, LlmsTxtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LlmsTxtError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_invalid_trigger_error() {
        let err = LlmsTxtError::InvalidTrigger("sometimes".to_string());
        assert!(err.to_string().contains("sometimes"));
        assert!(err.to_string().contains("query, accept, header or all"));
    }

    #[test]
    fn test_timeout_error() {
        let err = LlmsTxtError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_io_error_display_is_neutral() {
        let err: LlmsTxtError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, LlmsTxtError::IoError(_)));
        assert_eq!(err.to_string(), "I/O error: denied");
    }

    #[test]
    fn test_json_error_is_config_error() {
        let err: LlmsTxtError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, LlmsTxtError::ConfigError(_)));
    }
}
