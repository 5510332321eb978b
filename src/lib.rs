//! Catalog-Ingest: a crawl-and-ingest pipeline for a product catalog
//!
//! This crate walks a fixed category → subcategory → product listing
//! hierarchy on a remote site, extracts product records from the HTML,
//! normalizes product photos onto a fixed transparent canvas, and upserts
//! everything into a SQLite catalog store.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod media;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Catalog-Ingest operations
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run finished with {failures} failure(s)")]
    IncompleteRun { failures: usize },
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

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Errors raised while talking to the remote source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    /// The request never produced a usable response
    #[error("Transport failure for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// Whether a later attempt at the same URL could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result type alias for Catalog-Ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{slugify, Category, Product, ProductImage, SubCategory};
pub use config::Config;
pub use crawler::{CrawlReport, HttpFetcher, PageSource};
pub use storage::{CatalogStore, SqliteCatalog};
