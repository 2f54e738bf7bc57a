//! Lexicrawl: a lemma-indexing site search engine
//!
//! This crate crawls a configured set of web sites, reduces page text to
//! normalized word forms (lemmas), keeps an inverted index of lemmas to pages
//! in SQLite, and ranks pages for free-text queries against that index.

pub mod api;
pub mod config;
pub mod crawler;
pub mod indexing;
pub mod lemma;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Lexicrawl operations
#[derive(Debug, Error)]
pub enum LexiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

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
}

/// Errors reported by the indexing lifecycle operations
///
/// The display text of each variant is the message handed back to the
/// operator through the API boundary.
#[derive(Debug, Error)]
pub enum IndexingError {
    #[error("Indexing is already running")]
    AlreadyRunning,

    #[error("Indexing is not running")]
    NotRunning,

    #[error("Failed to stop indexing")]
    StoppingError,

    #[error("The page is outside the sites listed in the configuration file")]
    PageOutsideConfiguredSites,

    #[error("Failed to process page lemmas")]
    LemmaWorkError,

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Errors reported by the search engine
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("No indexed sites")]
    NoIndexedSites,

    #[error("Selected site is not indexed")]
    SiteNotIndexed,

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Result type alias for Lexicrawl operations
pub type Result<T> = std::result::Result<T, LexiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use api::SearchApi;
pub use config::Config;
pub use indexing::{IndexingService, JobRegistry};
pub use lemma::{Language, LemmaExtractor};
pub use search::SearchEngine;
pub use state::SiteStatus;
pub use storage::{SharedStorage, SqliteStorage, Storage};
