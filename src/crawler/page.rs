//! Fetching and indexing of a single page
//!
//! Shared by the crawl tree and single-page reindexing.

use crate::crawler::fetcher::{FetchFailure, Fetcher};
use crate::lemma::LemmaExtractor;
use crate::storage::{with_storage, SharedStorage, Storage, StorageResult};
use crate::url::normalize_page_url;
use std::sync::Arc;

/// What happened when a page was visited
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was stored and its lemmas folded into the index
    Indexed {
        page_id: i64,
        /// The stored markup, used for link expansion
        document: String,
    },

    /// A page already exists at this path
    AlreadyIndexed,

    /// The page could not be fetched; the failure is recorded on the site
    Failed(FetchFailure),
}

/// Fetches pages, stores them, and folds their lemmas into the index
pub struct PageIndexer {
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
    fetcher: Fetcher,
}

impl PageIndexer {
    pub fn new(storage: SharedStorage, extractor: Arc<LemmaExtractor>, fetcher: Fetcher) -> Self {
        Self {
            storage,
            extractor,
            fetcher,
        }
    }

    /// Visits one page of a site
    ///
    /// # Steps
    ///
    /// 1. Refresh the site's status time
    /// 2. Probe the URL without following redirects; on failure record the
    ///    error on the site and stop
    /// 3. Skip the page if one already exists at `(site_id, path)`
    /// 4. Fetch the document, following redirects
    /// 5. Insert the page; a uniqueness conflict means another task got there first
    /// 6. Extract lemmas from the stored markup and fold them into the index
    ///
    /// # Arguments
    ///
    /// * `site_id` - The owning site
    /// * `url` - Absolute, normalized page URL
    /// * `path` - Site-relative path of the page
    ///
    /// # Returns
    ///
    /// * `Ok(PageOutcome)` - The page was handled (indexed, skipped, or failed to fetch)
    /// * `Err(StorageError)` - The index could not be read or updated
    pub async fn fetch_and_store(
        &self,
        site_id: i64,
        url: &str,
        path: &str,
    ) -> StorageResult<PageOutcome> {
        with_storage(&self.storage, |s| s.touch_site(site_id))?;

        let status_code = match self.fetcher.probe(url).await {
            Ok(code) => code,
            Err(failure) => return self.record_failure(site_id, url, failure),
        };

        if with_storage(&self.storage, |s| s.find_page(site_id, path))?.is_some() {
            tracing::trace!("Page {} already indexed", url);
            return Ok(PageOutcome::AlreadyIndexed);
        }

        let document = match self.fetcher.fetch_document(url).await {
            Ok(document) => {
                if normalize_page_url(&document.final_url) != url {
                    tracing::trace!("{} redirected to {}", url, document.final_url);
                }
                document.body
            }
            Err(failure) => return self.record_failure(site_id, url, failure),
        };

        let inserted = with_storage(&self.storage, |s| {
            s.insert_page(site_id, path, status_code, &document)
        })?;
        let Some(page_id) = inserted else {
            tracing::trace!("Page {} was stored by another task", url);
            return Ok(PageOutcome::AlreadyIndexed);
        };

        // visible text only, so tag and attribute names never become lemmas
        let counts = self.extractor.extract_from_html(&document);
        let folded = with_storage(&self.storage, |s| {
            s.index_page_lemmas(site_id, page_id, &counts)
        });
        if let Err(e) = folded {
            tracing::warn!("Failed to index lemmas of {}: {}", url, e);
            if let Err(e) = with_storage(&self.storage, |s| s.remove_page(page_id)) {
                tracing::warn!("Failed to remove partially indexed page {}: {}", url, e);
            }
            return Err(e);
        }

        tracing::debug!("Indexed {} ({} lemmas)", url, counts.len());
        Ok(PageOutcome::Indexed { page_id, document })
    }

    fn record_failure(
        &self,
        site_id: i64,
        url: &str,
        failure: FetchFailure,
    ) -> StorageResult<PageOutcome> {
        tracing::debug!("Fetch of {} failed: {}", url, failure);
        let message = failure.to_string();
        with_storage(&self.storage, |s| s.update_site_error(site_id, Some(&message)))?;
        Ok(PageOutcome::Failed(failure))
    }
}
