// src/error.rs

//! Unified error handling for the scraping pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
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

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required record field was missing or empty at finalization
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page-shape or candidate-count sanity check failed
    #[error("Anomaly on {page_url}: {message}")]
    Anomaly { page_url: String, message: String },

    /// Batched existence check against the record store failed
    #[error("Oracle transport error: {0}")]
    OracleTransport(String),

    /// A raw candidate could not be turned into a draft record
    #[error("Extraction error for {context}: {message}")]
    Extraction { context: String, message: String },

    /// Record store rejected a write
    #[error("Store error: {0}")]
    Store(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
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

    /// Create an anomaly error for a page.
    pub fn anomaly(page_url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Anomaly {
            page_url: page_url.into(),
            message: message.to_string(),
        }
    }

    /// Create an oracle transport error.
    pub fn oracle(message: impl fmt::Display) -> Self {
        Self::OracleTransport(message.to_string())
    }

    /// Create an extraction error with context.
    pub fn extraction(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
