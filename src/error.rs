//! Error types for the Fivetran client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// Maximum number of characters of a response body carried inside an error
pub const PREVIEW_LIMIT: usize = 200;

/// The main error type for the Fivetran client
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
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for '{url}': {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Too Many Requests (429) for '{url}'. Retry limit ({max_retries}) exceeded")]
    RateLimitExceeded { url: String, max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error(
        "Failed to deserialize response. Endpoint='{endpoint}', Target='{target}', PayloadPreview=\"{preview}\""
    )]
    Decode {
        endpoint: String,
        target: String,
        preview: String,
        #[source]
        source: serde_json::Error,
    },

    // ============================================================================
    // Execution Errors
    // ============================================================================
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Background task failed: {message}")]
    Task { message: String },

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

impl Error {
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

    /// Create an HTTP status error, keeping only a bounded preview of the body
    pub fn http_status(status: u16, url: impl Into<String>, body: &str) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
            body: preview(body),
        }
    }

    /// Create a decode error for a body that did not match `target`
    pub fn decode(
        endpoint: impl Into<String>,
        target: impl Into<String>,
        body: &str,
        source: serde_json::Error,
    ) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            target: target.into(),
            preview: preview(body),
            source,
        }
    }

    /// Create a background task error
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// Check if this error was caused by server-side rate limiting
    ///
    /// A 429 never surfaces as `HttpStatus`: it is retried and ends as
    /// `RateLimitExceeded` once the retries are spent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimitExceeded { .. })
    }

    /// Check if this error is a cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// First `PREVIEW_LIMIT` characters of `body`, cut on a char boundary
pub fn preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_LIMIT) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}

/// Result type alias for the Fivetran client
pub type Result<T> = std::result::Result<T, Error>;
