use lexicrawl::config::{Config, CrawlerConfig, SearchConfig, SiteConfig, StorageConfig};
use lexicrawl::storage::{shared, SharedStorage, SqliteStorage};
use lexicrawl::SearchApi;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_USER_AGENT: &str = "LexicrawlTest/1.0";

/// Builds a configuration with short timeouts for the given `(url, name)` sites
pub fn test_config(sites: &[(&str, &str)]) -> Config {
    Config {
        crawler: CrawlerConfig {
            user_agent: TEST_USER_AGENT.to_string(),
            referrer: Some("https://www.google.com".to_string()),
            pacing_delay_ms: 5,
            stop_timeout_ms: 300,
            max_concurrent_pages: 4,
            request_timeout_secs: 10,
        },
        storage: StorageConfig {
            database_path: ":memory:".to_string(),
        },
        search: SearchConfig::default(),
        sites: sites
            .iter()
            .map(|(url, name)| SiteConfig {
                url: url.to_string(),
                name: name.to_string(),
            })
            .collect(),
    }
}

/// Wires the API around an in-memory index and hands back the shared store
pub fn test_api(config: Config) -> (SearchApi, SharedStorage) {
    let storage = shared(SqliteStorage::new_in_memory().expect("Failed to open in-memory index"));
    let api = SearchApi::with_storage(config, storage.clone()).expect("Failed to build API");
    (api, storage)
}

pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

pub fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Serves an HTML page at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_response(html_page(title, body)))
        .mount(server)
        .await;
}

/// Waits for every crawl to finish, failing the test after ten seconds
pub async fn wait_idle(api: &SearchApi) {
    tokio::time::timeout(
        Duration::from_secs(10),
        api.wait_until_idle(Duration::from_millis(10)),
    )
    .await
    .expect("Indexing did not finish in time");
}
