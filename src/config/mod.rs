//! Configuration module for Lexicrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files:
//! the list of sites to index, crawl options, storage location, and search tuning.
//!
//! # Example
//!
//! ```no_run
//! use lexicrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("lexicrawl.toml")).unwrap();
//! println!("User agent: {}", config.crawler.user_agent);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, SearchConfig, SiteConfig, StorageConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
