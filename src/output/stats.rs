//! Statistics over the index
//!
//! This module provides functionality for extracting and displaying
//! per-site indexing statistics from the storage layer.

use crate::config::SiteConfig;
use crate::state::SiteStatus;
use crate::storage::{SqliteStorage, Storage, StorageResult};
use crate::url::normalize_page_url;
use serde::Serialize;

/// Statistics of one configured site
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatistics {
    pub name: String,
    pub url: String,
    pub pages: u64,
    pub lemmas: u64,
    pub status: SiteStatus,
    pub last_error: Option<String>,
    /// Last status change or crawl activity; `None` for sites never indexed
    pub status_time_epoch_millis: Option<i64>,
}

/// Index-wide statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub total_sites: u64,
    pub total_pages: u64,
    pub total_lemmas: u64,
    pub per_site: Vec<SiteStatistics>,
}

/// Loads statistics from storage
///
/// Every configured site is reported. A site with no row in the index is
/// reported as NOTFOUND with zero counts.
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `sites` - The configured sites
///
/// # Returns
///
/// * `Ok(StatisticsSnapshot)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(
    storage: &SqliteStorage,
    sites: &[SiteConfig],
) -> StorageResult<StatisticsSnapshot> {
    let rows = storage.list_sites()?;
    let mut per_site = Vec::with_capacity(sites.len());

    for site in sites {
        let root = site.root_url();
        let row = rows
            .iter()
            .filter(|row| normalize_page_url(&row.url) == root)
            .max_by_key(|row| row.id);

        let stats = match row {
            Some(row) => SiteStatistics {
                name: site.name.clone(),
                url: site.url.clone(),
                pages: storage.count_pages(row.id)?,
                lemmas: storage.count_lemmas(row.id)?,
                status: row.status,
                last_error: row.last_error.clone(),
                status_time_epoch_millis: Some(row.status_time_millis()),
            },
            None => SiteStatistics {
                name: site.name.clone(),
                url: site.url.clone(),
                pages: 0,
                lemmas: 0,
                status: SiteStatus::NotFound,
                last_error: None,
                status_time_epoch_millis: None,
            },
        };
        per_site.push(stats);
    }

    Ok(StatisticsSnapshot {
        total_sites: sites.len() as u64,
        total_pages: storage.count_all_pages()?,
        total_lemmas: storage.count_all_lemmas()?,
        per_site,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StatisticsSnapshot) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Sites: {}", stats.total_sites);
    println!("  Pages: {}", stats.total_pages);
    println!("  Lemmas: {}", stats.total_lemmas);
    println!();

    println!("Sites:");
    for site in &stats.per_site {
        println!("  {} ({})", site.name, site.url);
        println!("    Status: {}", site.status);
        println!("    Pages: {}, Lemmas: {}", site.pages, site.lemmas);
        if let Some(millis) = site.status_time_epoch_millis {
            if let Some(time) = chrono::DateTime::from_timestamp_millis(millis) {
                println!("    Status time: {}", time.to_rfc3339());
            }
        }
        if let Some(error) = &site.last_error {
            println!("    Last error: {}", error);
        }
    }
}
