//! Prospect-Harvest: concurrent company-data acquisition
//!
//! This crate fetches candidate company pages under a global rate limit,
//! extracts company fields from their markup, normalizes addresses and
//! ingests deduplicated records into an external store.

pub mod address;
pub mod config;
pub mod harvest;
pub mod model;
pub mod output;
pub mod source;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Prospect-Harvest operations
///
/// Per-URL failures never surface here; they are carried inside
/// [`model::IngestOutcome`] values. This type covers what aborts a whole run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

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
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Prospect-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use address::AddressNormalizer;
pub use config::Config;
pub use harvest::{Coordinator, Extractor, FetchFailure, FetchResult, Fetcher, RateLimiter};
pub use model::{CompanyRecord, ExtractedFields, Field, IngestOutcome, ProgressSnapshot, RunResult};
