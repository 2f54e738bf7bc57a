//! Crawler module for web page fetching and indexing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with probe and document clients
//! - HTML link extraction restricted to the site
//! - Per-page storage and lemma folding
//! - The recursive, cancellable crawl tree

mod fetcher;
mod page;
mod parser;
mod task;

pub use fetcher::{build_http_client, FetchFailure, FetchedDocument, Fetcher};
pub use page::{PageIndexer, PageOutcome};
pub use parser::{extract_hrefs, extract_site_links};
pub use task::{crawl_site, CrawlContext, CrawlTask, Expansion};
