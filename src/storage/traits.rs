//! Storage traits and error types
//!
//! This module defines the trait interface for the inverted index store and
//! associated error types.

use crate::state::SiteStatus;
use crate::storage::{LemmaRecord, PageRecord, SiteRecord};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Site not found: {0}")]
    SiteNotFound(i64),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Each entity gets narrow lookup and mutation operations. The three
/// composite operations at the end keep the index consistent and must be
/// applied atomically by implementations.
pub trait Storage {
    // ===== Site Management =====

    /// Inserts a new site row with a fresh status time and no error
    ///
    /// # Returns
    ///
    /// The ID of the newly created site
    fn insert_site(&mut self, url: &str, name: &str, status: SiteStatus) -> StorageResult<i64>;

    /// Finds a site by its root URL
    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>>;

    /// Gets a site by ID
    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord>;

    /// Lists every site row
    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    /// Lists sites with the given status
    fn sites_with_status(&self, status: SiteStatus) -> StorageResult<Vec<SiteRecord>>;

    /// Counts sites with the given status
    fn count_sites_with_status(&self, status: SiteStatus) -> StorageResult<u64>;

    /// Sets the status of a site and refreshes its status time
    fn update_site_status(&mut self, site_id: i64, status: SiteStatus) -> StorageResult<()>;

    /// Refreshes the status time of a site
    fn touch_site(&mut self, site_id: i64) -> StorageResult<()>;

    /// Records (or clears) the last error of a site
    fn update_site_error(&mut self, site_id: i64, error: Option<&str>) -> StorageResult<()>;

    // ===== Page Management =====

    /// Inserts a page
    ///
    /// # Returns
    ///
    /// * `Some(id)` - The page was inserted
    /// * `None` - A page already exists at `(site_id, path)`
    fn insert_page(
        &mut self,
        site_id: i64,
        path: &str,
        status_code: u16,
        content: &str,
    ) -> StorageResult<Option<i64>>;

    /// Finds a page by site and path
    fn find_page(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>>;

    /// Gets a page by ID
    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    /// Gets the IDs of every page on a site
    fn page_ids_for_site(&self, site_id: i64) -> StorageResult<Vec<i64>>;

    /// Counts pages on a site
    fn count_pages(&self, site_id: i64) -> StorageResult<u64>;

    // ===== Lemma Management =====

    /// Finds a lemma on a site
    fn find_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>>;

    /// Counts lemmas on a site
    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64>;

    // ===== Link Management =====

    /// Gets the weight of a lemma on a page
    fn link_weight(&self, page_id: i64, lemma_id: i64) -> StorageResult<Option<f64>>;

    /// Gets the IDs of pages where the lemma has a positive weight
    fn pages_with_lemma(&self, lemma_id: i64) -> StorageResult<Vec<i64>>;

    // ===== Index Maintenance =====

    /// Folds the lemma counts of one page into the index
    ///
    /// For each lemma: the lemma row is created if missing; when the page is
    /// not yet linked to it, the frequency is incremented and a link with
    /// `weight = count` is created; otherwise `count` is added to the
    /// existing weight and the frequency is left alone.
    fn index_page_lemmas(
        &mut self,
        site_id: i64,
        page_id: i64,
        counts: &HashMap<String, usize>,
    ) -> StorageResult<()>;

    /// Deletes a page and its links, decrementing (or deleting) the lemmas
    /// it contributed to
    fn remove_page(&mut self, page_id: i64) -> StorageResult<()>;

    /// Deletes all links, pages, and lemmas of a site, then the site row
    fn clear_site(&mut self, site_id: i64) -> StorageResult<()>;
}
