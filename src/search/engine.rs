use crate::config::SearchConfig;
use crate::lemma::{strip_markup, LemmaExtractor};
use crate::search::snippet::{build_snippet, extract_title};
use crate::search::types::{SearchResult, SearchResults};
use crate::state::SiteStatus;
use crate::storage::{lock, LemmaRecord, SharedStorage, SiteRecord, SqliteStorage, Storage, StorageResult};
use crate::url::normalize_page_url;
use crate::SearchError;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Floor for the relevance divisor
const MIN_RELEVANCE_DIVISOR: f64 = 1e-5;

/// Ranks indexed pages against free-text queries
///
/// Reads only from the index store, so searches may run while crawls are
/// in flight.
pub struct SearchEngine {
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(storage: SharedStorage, extractor: Arc<LemmaExtractor>, config: SearchConfig) -> Self {
        Self {
            storage,
            extractor,
            config,
        }
    }

    /// Searches indexed sites for pages containing every lemma of the query
    ///
    /// # Arguments
    ///
    /// * `query` - Free text; every lemma it reduces to must be present on a page
    /// * `site_filter` - Root URL of the one site to search, or `None` for all
    ///   indexed sites
    ///
    /// # Returns
    ///
    /// Results from every eligible site, sorted by relevance descending.
    /// The list is not paginated.
    ///
    /// # Errors
    ///
    /// * `EmptyQuery` - The query is blank
    /// * `NoIndexedSites` - No filter was given and no site is INDEXED
    /// * `SiteNotIndexed` - The filtered site is unknown or not INDEXED
    pub fn search(&self, query: &str, site_filter: Option<&str>) -> Result<SearchResults, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let storage = lock(&self.storage)?;
        let sites = eligible_sites(&storage, site_filter)?;

        let lemmas: Vec<String> = self.extractor.extract_all(query).into_keys().collect();
        let plain_query = query.trim();

        let mut items = Vec::new();
        for site in &sites {
            items.extend(self.search_site(&storage, site, &lemmas, plain_query)?);
        }
        drop(storage);

        // stable: equal relevance keeps site and page order
        items.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });

        tracing::debug!("Query {:?} matched {} pages", plain_query, items.len());
        Ok(SearchResults::new(items))
    }

    fn search_site(
        &self,
        storage: &SqliteStorage,
        site: &SiteRecord,
        lemmas: &[String],
        query: &str,
    ) -> StorageResult<Vec<SearchResult>> {
        let Some(lemmas) = query_lemmas(storage, site.id, lemmas, self.config.common_lemma_percent)? else {
            return Ok(Vec::new());
        };

        let mut candidates: BTreeSet<i64> = storage.page_ids_for_site(site.id)?.into_iter().collect();
        for lemma in &lemmas {
            let pages: BTreeSet<i64> = storage.pages_with_lemma(lemma.id)?.into_iter().collect();
            candidates.retain(|id| pages.contains(id));
            if candidates.is_empty() {
                return Ok(Vec::new());
            }
        }

        // pages without a snippet are dropped before normalizing
        let mut results = Vec::with_capacity(candidates.len());
        for page_id in candidates {
            let page = storage.get_page(page_id)?;
            let text = strip_markup(&page.content);
            let snippet = build_snippet(&self.extractor, &text, query, self.config.snippet_width);
            if snippet.is_empty() {
                continue;
            }

            let mut absolute = 0.0;
            for lemma in &lemmas {
                absolute += storage.link_weight(page_id, lemma.id)?.unwrap_or(0.0);
            }

            results.push(SearchResult {
                site: site.url.clone(),
                site_name: site.name.clone(),
                uri: page.path,
                title: extract_title(&page.content),
                snippet,
                relevance: absolute,
            });
        }

        let max_relevance = results.iter().map(|r| r.relevance).fold(0.0_f64, f64::max);
        let divisor = max_relevance.max(MIN_RELEVANCE_DIVISOR);
        for result in &mut results {
            result.relevance /= divisor;
        }
        results.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });
        Ok(results)
    }
}

/// Resolves which sites a search runs against
fn eligible_sites(
    storage: &SqliteStorage,
    site_filter: Option<&str>,
) -> Result<Vec<SiteRecord>, SearchError> {
    let filter = site_filter.map(str::trim).filter(|s| !s.is_empty());

    match filter {
        None => {
            let sites = storage.sites_with_status(SiteStatus::Indexed)?;
            if sites.is_empty() {
                return Err(SearchError::NoIndexedSites);
            }
            Ok(sites)
        }
        Some(url) => {
            let wanted = normalize_page_url(url);
            let site = storage
                .list_sites()?
                .into_iter()
                .find(|site| normalize_page_url(&site.url) == wanted)
                .filter(|site| site.status.is_searchable())
                .ok_or(SearchError::SiteNotIndexed)?;
            Ok(vec![site])
        }
    }
}

/// Looks up the query lemmas on a site and orders them rarest first
///
/// Returns `None` when some lemma does not occur on the site. Lemmas whose
/// frequency reaches `common_percent` of the summed frequencies are dropped
/// while more than one lemma remains, most frequent first.
fn query_lemmas(
    storage: &SqliteStorage,
    site_id: i64,
    lemmas: &[String],
    common_percent: u32,
) -> StorageResult<Option<Vec<LemmaRecord>>> {
    if lemmas.is_empty() {
        return Ok(None);
    }

    let mut records = Vec::with_capacity(lemmas.len());
    for lemma in lemmas {
        match storage.find_lemma(site_id, lemma)? {
            Some(record) if record.frequency > 0 => records.push(record),
            _ => return Ok(None),
        }
    }

    let total: u64 = records.iter().map(|r| r.frequency).sum();
    records.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.lemma.cmp(&b.lemma)));

    let mut kept = Vec::with_capacity(records.len());
    let mut remaining = records.len();
    for record in records {
        let too_common = record.frequency * 100 >= u64::from(common_percent) * total;
        if too_common && remaining > 1 {
            tracing::trace!("Dropping common lemma {:?}", record.lemma);
            remaining -= 1;
            continue;
        }
        kept.push(record);
    }

    kept.sort_by(|a, b| a.frequency.cmp(&b.frequency).then_with(|| a.lemma.cmp(&b.lemma)));
    Ok(Some(kept))
}
