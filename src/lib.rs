//! Gamewire: a gaming-news ingestion pipeline
//!
//! This crate discovers article links on configured news sites, extracts
//! structured fields with per-site selector rules, converts article markup into
//! bounded sequences of content blocks and hands the results to a store that a
//! synchronization client drains.

pub mod blocks;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Gamewire operations
#[derive(Debug, Error)]
pub enum GamewireError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url} after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Cannot fetch {url}: {message}")]
    Unsupported { url: String, message: String },

    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Rejected link: {0}")]
    Rejected(String),
}

/// Result type alias for Gamewire operations
pub type Result<T> = std::result::Result<T, GamewireError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use blocks::{convert, Annotations, BlockLimits, ContentBlock, RichSpan};
pub use config::{Config, SourceRule};
pub use extract::{ExtractedArticle, FieldExtractor};
pub use state::SyncState;
