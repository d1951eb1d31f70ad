//! Error types for the fanqie scraper.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scraping operations.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The required element isn't found in HTML
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// URL parsing or validation failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The scraper doesn't support this URL
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

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Error type for translation operations.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// HTTP request to API failed
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error: {0}")]
    ApiError(String),

    /// Translation was refused by the model
    #[error("Translation refused: {0}")]
    Refused(String),
}

/// Error type for loading the glyph remap data file.
///
/// Any of these aborts startup; a partially loaded table is never used.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Failed to read the mapping file
    #[error("Failed to read mapping file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping file is not valid JSON of a supported shape
    #[error("Failed to parse mapping JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Mapping file parsed but its entries are unusable
    #[error("Invalid mapping data: {0}")]
    InvalidData(String),
}

/// Error type for reading and writing scrape output documents.
#[derive(Error, Debug)]
pub enum OutputError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document could not be (de)serialized
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}
