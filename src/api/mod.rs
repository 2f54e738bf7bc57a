//! Boundary facade
//!
//! Wires the index store, extractor, orchestrator, and search engine from a
//! configuration, and exposes the five operator operations with
//! serializable `{ok, errorMessage}` style responses. No error escapes as a
//! panic or a `Result`; failures are reported in the response.

use crate::config::Config;
use crate::indexing::{IndexingService, JobRegistry};
use crate::lemma::LemmaExtractor;
use crate::output::{load_statistics, StatisticsSnapshot};
use crate::search::{SearchEngine, SearchResult};
use crate::storage::{lock, open_storage, SharedStorage};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a lifecycle operation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexingResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl IndexingResponse {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                error_message: None,
            },
            Err(e) => Self {
                ok: false,
                error_message: Some(e.to_string()),
            },
        }
    }
}

/// One search hit as reported to callers
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub site: String,
    pub site_name: String,
    pub relevance: f64,
    pub uri: String,
    pub title: String,
    pub snippet: String,
}

impl From<SearchResult> for SearchItem {
    fn from(result: SearchResult) -> Self {
        Self {
            site: result.site,
            site_name: result.site_name,
            relevance: result.relevance,
            uri: result.uri,
            title: result.title,
            snippet: result.snippet,
        }
    }
}

/// A page of search results
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub ok: bool,
    /// Total number of results before pagination
    pub count: usize,
    pub items: Vec<SearchItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Index statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// The operations an operator-facing layer calls
pub struct SearchApi {
    config: Arc<Config>,
    storage: SharedStorage,
    indexing: IndexingService,
    engine: SearchEngine,
}

impl SearchApi {
    /// Opens the database named in the configuration and wires everything up
    pub fn from_config(config: Config) -> crate::Result<Self> {
        let storage = open_storage(Path::new(&config.storage.database_path))?;
        Self::with_storage(config, storage)
    }

    /// Wires everything up around an already opened store
    pub fn with_storage(config: Config, storage: SharedStorage) -> crate::Result<Self> {
        let config = Arc::new(config);
        let extractor = Arc::new(LemmaExtractor::new());
        let registry = Arc::new(JobRegistry::new());

        let indexing = IndexingService::new(
            config.clone(),
            storage.clone(),
            registry,
            extractor.clone(),
        )?;
        let engine = SearchEngine::new(storage.clone(), extractor, config.search.clone());

        Ok(Self {
            config,
            storage,
            indexing,
            engine,
        })
    }

    /// The orchestrator, for callers that need the lifecycle helpers
    pub fn indexing(&self) -> &IndexingService {
        &self.indexing
    }

    pub async fn start_indexing(&self) -> IndexingResponse {
        IndexingResponse::from_result(self.indexing.start_indexing().await)
    }

    pub async fn stop_indexing(&self) -> IndexingResponse {
        IndexingResponse::from_result(self.indexing.stop_indexing().await)
    }

    pub async fn index_page(&self, url: &str) -> IndexingResponse {
        IndexingResponse::from_result(self.indexing.index_page(url).await)
    }

    /// Searches and returns `limit` results starting at `offset`
    ///
    /// `count` reports the number of results before slicing.
    pub fn search(
        &self,
        query: &str,
        site: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> SearchResponse {
        match self.engine.search(query, site) {
            Ok(results) => SearchResponse {
                ok: true,
                count: results.count,
                items: results
                    .items
                    .into_iter()
                    .skip(offset)
                    .take(limit)
                    .map(SearchItem::from)
                    .collect(),
                error_message: None,
            },
            Err(e) => SearchResponse {
                ok: false,
                count: 0,
                items: Vec::new(),
                error_message: Some(e.to_string()),
            },
        }
    }

    pub fn statistics(&self) -> StatisticsResponse {
        let snapshot =
            lock(&self.storage).and_then(|storage| load_statistics(&storage, &self.config.sites));
        match snapshot {
            Ok(statistics) => StatisticsResponse {
                ok: true,
                statistics: Some(statistics),
                error_message: None,
            },
            Err(e) => StatisticsResponse {
                ok: false,
                statistics: None,
                error_message: Some(e.to_string()),
            },
        }
    }

    /// Waits for every running crawl to finish
    pub async fn wait_until_idle(&self, poll: Duration) {
        self.indexing.wait_until_idle(poll).await
    }
}
