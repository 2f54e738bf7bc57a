//! Indexing orchestrator
//!
//! Manages one concurrent crawl job per configured site, owns the site
//! status lifecycle, supports bounded-time cancellation, and reindexes
//! single pages on demand.

mod registry;
mod service;

pub use registry::{CrawlJob, JobRegistry};
pub use service::{IndexingService, INTERRUPTED, STOPPED_BY_USER};
