//! Registry of running crawl jobs, keyed by site id

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running crawl of one site
#[derive(Debug)]
pub struct CrawlJob {
    /// Signals every task of the crawl to stop
    pub token: CancellationToken,
    /// The job's top-level task
    pub handle: JoinHandle<()>,
}

/// Live crawl jobs, shared by the indexing service and the jobs themselves
///
/// The registry is owned by whoever builds the service and handed in as a
/// dependency; there is no global instance.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<i64, CrawlJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<i64, CrawlJob>> {
        // the map stays consistent even if a holder panicked
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawns a job and registers it under `site_id`
    ///
    /// The spawn happens while the registry lock is held, so a job that
    /// finishes immediately cannot deregister before it was registered.
    pub fn register<F>(&self, site_id: i64, token: CancellationToken, spawn: F)
    where
        F: FnOnce() -> JoinHandle<()>,
    {
        let mut jobs = self.jobs();
        let handle = spawn();
        if let Some(previous) = jobs.insert(site_id, CrawlJob { token, handle }) {
            tracing::warn!("Replacing crawl job registered for site {}", site_id);
            previous.token.cancel();
        }
    }

    /// Removes and returns the job of a site
    pub fn take(&self, site_id: i64) -> Option<CrawlJob> {
        self.jobs().remove(&site_id)
    }

    /// Puts back a job that could not be stopped
    pub fn restore(&self, site_id: i64, job: CrawlJob) {
        self.jobs().insert(site_id, job);
    }

    /// Deregisters a site's job; called by the job when it completes
    pub fn remove(&self, site_id: i64) {
        self.jobs().remove(&site_id);
    }

    pub fn contains(&self, site_id: i64) -> bool {
        self.jobs().contains_key(&site_id)
    }

    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs().is_empty()
    }
}
