//! LyngSat Wayback: a catalog extractor for archived satellite TV listings
//!
//! This crate walks historical captures of a satellite directory site held by a
//! public web archive, rebuilds the region → country → channel hierarchy from
//! its irregular HTML tables, and persists one tree per capture for later
//! flattening into tabular reports.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for LyngSat Wayback operations
#[derive(Debug, Error)]
pub enum WaybackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] crawler::FetchError),

    #[error("Channel table at {url} has no header columns")]
    EmptySchema { url: String },

    #[error("No entry point found on {url}: {message}")]
    NoEntryPoint { url: String, message: String },

    #[error("Archive index query failed: {0}")]
    ArchiveIndex(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Unusable link target: {0}")]
    Unusable(String),
}

/// Result type alias for LyngSat Wayback operations
pub type Result<T> = std::result::Result<T, WaybackError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, SiteProfile};
pub use crawler::{Coordinator, HttpGateway, PageSource};
pub use model::{ArchiveSnapshot, Cell, ChannelRecord, CountryResult, RegionResult};
pub use url::{normalize_visit_key, split_archive_url};
