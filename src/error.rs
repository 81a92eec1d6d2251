//! Error types for ffscrape.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Main error type for fetching and parsing story pages.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// A script variable or element the page is expected to carry is absent.
    /// Usually means the site markup changed.
    #[error("Required field missing: {0}")]
    MissingField(String),

    /// The "Rated:" line split into fewer tokens than it always carries.
    #[error("Malformed rating line (expected at least {expected} tokens, found {found}): {line}")]
    MalformedToken {
        line: String,
        expected: usize,
        found: usize,
    },

    /// A value was present but could not be converted
    #[error("Failed to parse {field}: {message}")]
    ParseError { field: String, message: String },

    /// A chapter page reported a different story than the one being read
    #[error("Chapter page belongs to story {found}, expected {expected}")]
    ChapterMismatch { expected: u64, found: u64 },

    /// URL parsing or validation failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The URL does not point at a story on the site
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}
