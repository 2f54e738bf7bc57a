//! Recursive, cancellable crawl tasks
//!
//! A crawl is a tree of tasks. Each task visits its own page, then forks one
//! child per same-site link on that page and joins them all before
//! returning the set of links its subtree visited. Every task checks the
//! site's cancellation token before fetching and again before expanding.

use crate::crawler::page::{PageIndexer, PageOutcome};
use crate::crawler::parser::extract_site_links;
use crate::url::site_relative_path;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Boxed expansion future; the crawl tree recurses through it
pub type Expansion = Pin<Box<dyn Future<Output = HashSet<String>> + Send>>;

/// Everything a crawl task of one site needs
pub struct CrawlContext {
    pub site_id: i64,
    /// Normalized site root URL
    pub root_url: String,
    /// `scheme://host[:port]` of the site root
    pub parent_link: String,
    pub indexer: Arc<PageIndexer>,
    /// Delay before a page's links are expanded
    pub pacing: Duration,
    /// Bounds concurrent page visits for the site
    pub permits: Arc<Semaphore>,
    pub token: CancellationToken,
}

/// A page that was visited successfully and is ready to expand
pub struct CrawlTask {
    ctx: Arc<CrawlContext>,
    url: String,
    document: String,
}

impl CrawlTask {
    /// Visits a page and returns a task for it if it produced a new document
    ///
    /// Returns `None` when the site is cancelled, the URL is not under the
    /// site root, the page was already indexed, or the fetch failed.
    pub async fn prepare(ctx: Arc<CrawlContext>, url: String) -> Option<CrawlTask> {
        if ctx.token.is_cancelled() {
            return None;
        }

        let path = site_relative_path(&url, &ctx.root_url)?;

        let _permit = tokio::select! {
            _ = ctx.token.cancelled() => return None,
            permit = ctx.permits.clone().acquire_owned() => permit.ok()?,
        };

        match ctx.indexer.fetch_and_store(ctx.site_id, &url, &path).await {
            Ok(PageOutcome::Indexed { document, .. }) => Some(CrawlTask { ctx, url, document }),
            Ok(PageOutcome::AlreadyIndexed) | Ok(PageOutcome::Failed(_)) => None,
            Err(e) => {
                tracing::warn!("Failed to store {}: {}", url, e);
                None
            }
        }
    }

    /// Expands the page into child tasks and joins them
    ///
    /// # Returns
    ///
    /// This page's URL plus every link visited by the subtree
    pub fn expand(self) -> Expansion {
        Box::pin(async move {
            let CrawlTask { ctx, url, document } = self;
            let mut visited = HashSet::new();
            visited.insert(url.clone());

            tokio::select! {
                _ = ctx.token.cancelled() => return visited,
                _ = tokio::time::sleep(ctx.pacing) => {}
            }
            if ctx.token.is_cancelled() {
                return visited;
            }

            let links = extract_site_links(&document, &url, &ctx.root_url);
            drop(document);

            // dropping the set aborts any children still running
            let mut children = JoinSet::new();
            for link in links {
                if ctx.token.is_cancelled() {
                    break;
                }
                visited.insert(link.clone());
                if let Some(child) = CrawlTask::prepare(ctx.clone(), link).await {
                    children.spawn(child.expand());
                }
            }

            while let Some(joined) = children.join_next().await {
                match joined {
                    Ok(subtree) => visited.extend(subtree),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => tracing::warn!("Crawl task under {} failed: {}", url, e),
                }
            }

            visited
        })
    }
}

/// Crawls a whole site starting from its root page
///
/// # Returns
///
/// The set of links visited, used for completion reporting only
pub async fn crawl_site(ctx: Arc<CrawlContext>) -> HashSet<String> {
    tracing::info!("Crawling {} (site {})", ctx.root_url, ctx.site_id);

    let root = ctx.root_url.clone();
    let visited = match CrawlTask::prepare(ctx.clone(), root).await {
        Some(task) => task.expand().await,
        None => HashSet::new(),
    };

    tracing::info!(
        "Finished crawling {} from {}: {} links visited",
        ctx.root_url,
        ctx.parent_link,
        visited.len()
    );
    visited
}
