//! Indexing lifecycle: start, stop, and single-page reindexing

use crate::config::{Config, SiteConfig};
use crate::crawler::{crawl_site, CrawlContext, Fetcher, PageIndexer, PageOutcome};
use crate::indexing::registry::{CrawlJob, JobRegistry};
use crate::lemma::LemmaExtractor;
use crate::state::SiteStatus;
use crate::storage::{with_storage, SharedStorage, SiteRecord, Storage, StorageResult};
use crate::url::{normalize_page_url, parent_link, site_relative_path};
use crate::IndexingError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Error recorded on a site stopped through [`IndexingService::stop_indexing`]
pub const STOPPED_BY_USER: &str = "Indexing stopped by user";

/// Error recorded on a site whose crawl was cut off by a process exit
pub const INTERRUPTED: &str = "Indexing interrupted";

/// Owns the per-site crawl jobs and the site status lifecycle
///
/// `NOTFOUND -> INDEXING -> {INDEXED, FAILED}`, and `FAILED -> INDEXING`
/// on restart. Single-page indexing never moves a site to INDEXING.
pub struct IndexingService {
    config: Arc<Config>,
    storage: SharedStorage,
    registry: Arc<JobRegistry>,
    indexer: Arc<PageIndexer>,
}

impl IndexingService {
    /// Creates the service
    ///
    /// # Arguments
    ///
    /// * `config` - Sites and crawl options
    /// * `storage` - The shared index store
    /// * `registry` - Registry of running jobs
    /// * `extractor` - Lemma extractor shared with search
    pub fn new(
        config: Arc<Config>,
        storage: SharedStorage,
        registry: Arc<JobRegistry>,
        extractor: Arc<LemmaExtractor>,
    ) -> crate::Result<Self> {
        let fetcher = Fetcher::new(&config.crawler)?;
        let indexer = Arc::new(PageIndexer::new(storage.clone(), extractor, fetcher));
        Ok(Self {
            config,
            storage,
            registry,
            indexer,
        })
    }

    fn stop_window(&self) -> Duration {
        Duration::from_millis(self.config.crawler.stop_timeout_ms)
    }

    fn store<T>(
        &self,
        f: impl FnOnce(&mut crate::storage::SqliteStorage) -> StorageResult<T>,
    ) -> Result<T, IndexingError> {
        Ok(with_storage(&self.storage, f)?)
    }

    /// Returns true if any site is being indexed
    pub fn is_running(&self) -> Result<bool, IndexingError> {
        Ok(self.store(|s| s.count_sites_with_status(SiteStatus::Indexing))? > 0)
    }

    /// Marks sites left INDEXING by a previous process as FAILED
    ///
    /// Only rows without a live job in this process are touched.
    ///
    /// # Returns
    ///
    /// The number of sites recovered
    pub fn recover_interrupted_sites(&self) -> Result<usize, IndexingError> {
        let stale: Vec<SiteRecord> = self
            .store(|s| s.sites_with_status(SiteStatus::Indexing))?
            .into_iter()
            .filter(|site| !self.registry.contains(site.id))
            .collect();

        for site in &stale {
            tracing::warn!("Site {} was left indexing, marking it failed", site.url);
            self.store(|s| {
                s.update_site_status(site.id, SiteStatus::Failed)?;
                s.update_site_error(site.id, Some(INTERRUPTED))
            })?;
        }
        Ok(stale.len())
    }

    /// Starts a fresh crawl of every configured site
    ///
    /// Existing data of each configured site is cleared and a new site row
    /// is created in INDEXING state; one crawl job per site is spawned and
    /// registered. A site whose URL cannot be parsed is recorded as FAILED
    /// and gets no job. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// * `AlreadyRunning` - Some site is still being indexed
    pub async fn start_indexing(&self) -> Result<(), IndexingError> {
        if self.is_running()? {
            return Err(IndexingError::AlreadyRunning);
        }

        for site in &self.config.sites {
            self.clear_configured_site(site)?;

            let parent = match parent_link(&site.url) {
                Ok(parent) => parent,
                Err(e) => {
                    tracing::error!("Cannot index {}: {}", site.url, e);
                    let message = format!("Invalid site URL: {}", e);
                    self.store(|s| {
                        let id = s.insert_site(&site.url, &site.name, SiteStatus::Failed)?;
                        s.update_site_error(id, Some(&message))
                    })?;
                    continue;
                }
            };

            let site_id =
                self.store(|s| s.insert_site(&site.url, &site.name, SiteStatus::Indexing))?;
            self.spawn_job(site_id, site, parent);
        }

        tracing::info!("Indexing started for {} sites", self.registry.len());
        Ok(())
    }

    fn clear_configured_site(&self, site: &SiteConfig) -> Result<(), IndexingError> {
        let root = site.root_url();
        self.store(|s| {
            for existing in s.list_sites()? {
                if normalize_page_url(&existing.url) == root {
                    s.clear_site(existing.id)?;
                }
            }
            Ok(())
        })
    }

    fn spawn_job(&self, site_id: i64, site: &SiteConfig, parent: String) {
        let token = CancellationToken::new();
        let ctx = Arc::new(CrawlContext {
            site_id,
            root_url: site.root_url(),
            parent_link: parent,
            indexer: self.indexer.clone(),
            pacing: Duration::from_millis(self.config.crawler.pacing_delay_ms),
            permits: Arc::new(Semaphore::new(self.config.crawler.max_concurrent_pages as usize)),
            token: token.clone(),
        });

        let storage = self.storage.clone();
        let registry = self.registry.clone();
        self.registry.register(site_id, token, move || {
            tokio::spawn(run_job(ctx, storage, registry))
        });
    }

    /// Stops every running crawl
    ///
    /// Each job is cancelled and given one stop window to drain, then
    /// aborted and given a second window. A stopped site is marked FAILED
    /// with [`STOPPED_BY_USER`]. A job that outlives both windows stays
    /// registered.
    ///
    /// # Errors
    ///
    /// * `NotRunning` - No site is being indexed
    /// * `StoppingError` - The job registry never matched the INDEXING
    ///   sites, or at least one job did not terminate
    pub async fn stop_indexing(&self) -> Result<(), IndexingError> {
        let mut indexing = self.store(|s| s.sites_with_status(SiteStatus::Indexing))?;
        if indexing.is_empty() {
            return Err(IndexingError::NotRunning);
        }

        if self.registry.len() != indexing.len() {
            tracing::debug!(
                "{} jobs registered for {} indexing sites, waiting",
                self.registry.len(),
                indexing.len()
            );
            tokio::time::sleep(self.stop_window()).await;
            indexing = self.store(|s| s.sites_with_status(SiteStatus::Indexing))?;
            if self.registry.len() != indexing.len() {
                return Err(IndexingError::StoppingError);
            }
        }

        let mut failed = 0;
        for site in &indexing {
            let Some(job) = self.registry.take(site.id) else {
                continue;
            };

            // the job may have finished its crawl while earlier sites stopped
            let status = self.store(|s| s.get_site(site.id))?.status;
            if status != SiteStatus::Indexing {
                tracing::debug!("Site {} already left INDEXING ({})", site.url, status);
                self.registry.restore(site.id, job);
                continue;
            }

            match self.terminate(job).await {
                Ok(()) => {
                    self.store(|s| {
                        s.update_site_status(site.id, SiteStatus::Failed)?;
                        s.update_site_error(site.id, Some(STOPPED_BY_USER))
                    })?;
                    tracing::info!("Stopped indexing {}", site.url);
                }
                Err(job) => {
                    tracing::error!("Crawl of {} did not stop in time", site.url);
                    self.registry.restore(site.id, job);
                    self.store(|s| s.touch_site(site.id))?;
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(IndexingError::StoppingError);
        }
        Ok(())
    }

    /// Cancels a job, then aborts it if it does not drain in time
    ///
    /// Gives the job back if it survives both windows.
    async fn terminate(&self, job: CrawlJob) -> Result<(), CrawlJob> {
        let CrawlJob { token, mut handle } = job;
        let window = self.stop_window();

        token.cancel();
        if tokio::time::timeout(window, &mut handle).await.is_ok() {
            return Ok(());
        }

        handle.abort();
        if tokio::time::timeout(window, &mut handle).await.is_ok() {
            return Ok(());
        }

        Err(CrawlJob { token, handle })
    }

    /// Fetches and indexes one page of a configured site
    ///
    /// Any page already stored at the same path is removed first, together
    /// with its links and lemma contributions. A site without a row yet is
    /// created as INDEXED.
    ///
    /// # Errors
    ///
    /// * `PageOutsideConfiguredSites` - No configured site contains the URL,
    ///   or the URL is a site root
    /// * `LemmaWorkError` - The page could not be fetched or indexed
    pub async fn index_page(&self, url: &str) -> Result<(), IndexingError> {
        let site = self
            .config
            .site_for_url(url)
            .ok_or(IndexingError::PageOutsideConfiguredSites)?;

        let page_url = normalize_page_url(url);
        let root = site.root_url();
        if page_url == root {
            return Err(IndexingError::PageOutsideConfiguredSites);
        }
        let path =
            site_relative_path(&page_url, &root).ok_or(IndexingError::PageOutsideConfiguredSites)?;

        let site_id = self.store(|s| {
            let existing = s
                .list_sites()?
                .into_iter()
                .find(|row| normalize_page_url(&row.url) == root);
            match existing {
                Some(row) => Ok(row.id),
                None => s.insert_site(&site.url, &site.name, SiteStatus::Indexed),
            }
        })?;

        self.store(|s| match s.find_page(site_id, &path)? {
            Some(page) => s.remove_page(page.id),
            None => Ok(()),
        })?;

        match self.indexer.fetch_and_store(site_id, &page_url, &path).await {
            Ok(PageOutcome::Indexed { .. }) | Ok(PageOutcome::AlreadyIndexed) => {
                tracing::info!("Indexed page {}", page_url);
                Ok(())
            }
            Ok(PageOutcome::Failed(failure)) => {
                tracing::warn!("Could not index {}: {}", page_url, failure);
                Err(IndexingError::LemmaWorkError)
            }
            Err(e) => {
                tracing::warn!("Could not index {}: {}", page_url, e);
                Err(IndexingError::LemmaWorkError)
            }
        }
    }

    /// Waits until no crawl job is registered
    pub async fn wait_until_idle(&self, poll: Duration) {
        while !self.registry.is_empty() {
            tokio::time::sleep(poll).await;
        }
    }
}

/// Body of one site's crawl job
async fn run_job(ctx: Arc<CrawlContext>, storage: SharedStorage, registry: Arc<JobRegistry>) {
    let site_id = ctx.site_id;
    let visited = crawl_site(ctx.clone()).await;

    let result = if ctx.token.is_cancelled() {
        with_storage(&storage, |s| {
            s.update_site_status(site_id, SiteStatus::Failed)?;
            s.update_site_error(site_id, Some(STOPPED_BY_USER))
        })
    } else {
        with_storage(&storage, |s| {
            s.touch_site(site_id)?;
            s.update_site_status(site_id, SiteStatus::Indexed)
        })
    };

    match result {
        Ok(()) => tracing::info!(
            "Crawl job for site {} finished, {} links visited",
            site_id,
            visited.len()
        ),
        Err(e) => tracing::error!("Failed to record the end of crawl {}: {}", site_id, e),
    }

    registry.remove(site_id);
}
