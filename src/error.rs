//! Error types for the downloader.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for fetching, extracting and saving novel content.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Connection, DNS or timeout failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("Unexpected HTTP status: {0}")]
    HttpStatus(u16),

    /// Response declared gzip but could not be inflated
    #[error("Failed to decompress gzip body: {0}")]
    Decoding(std::io::Error),

    /// Failed to parse HTML content or a selector
    #[error("Failed to parse HTML: {0}")]
    Parse(String),

    /// URL parsing or resolution failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The catalog page contained no chapter links
    #[error("No chapters found on the catalog page")]
    NoChaptersFound,

    /// The chapter page had no body text
    #[error("Chapter content is empty")]
    EmptyContent,

    /// The novel directory is already present
    #[error("Novel directory already exists, remove '{}' and try again", .0.display())]
    DirectoryExists(PathBuf),

    /// File or directory operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
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

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
