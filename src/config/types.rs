use serde::Deserialize;

/// Main configuration structure for Lexicrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

impl Config {
    /// Finds the configured site whose root URL is a prefix of `url`
    ///
    /// Matching is case-insensitive, ignores a trailing slash on the site root,
    /// and only accepts a prefix that ends at a path or query boundary,
    /// so `https://example.com` does not claim `https://example.com.evil.org/`.
    pub fn site_for_url(&self, url: &str) -> Option<&SiteConfig> {
        let url = url.trim().to_lowercase();
        self.sites.iter().find(|site| {
            let root = site.root_url();
            match url.strip_prefix(root.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
                None => false,
            }
        })
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Referer header sent with every request
    #[serde(default)]
    pub referrer: Option<String>,

    /// Delay before a page's links are expanded (milliseconds)
    #[serde(rename = "pacing-delay-ms", default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Length of each wait window when stopping a crawl job (milliseconds)
    #[serde(rename = "stop-timeout-ms", default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    /// Maximum number of pages fetched concurrently per site
    #[serde(rename = "max-concurrent-pages", default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Search ranking and presentation settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Lemmas whose page frequency reaches this share of the query's total
    /// page occurrences are dropped from ranking
    #[serde(rename = "common-lemma-percent", default = "default_common_lemma_percent")]
    pub common_lemma_percent: u32,

    /// Characters of context kept on each side of a highlighted word
    #[serde(rename = "snippet-width", default = "default_snippet_width")]
    pub snippet_width: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            common_lemma_percent: default_common_lemma_percent(),
            snippet_width: default_snippet_width(),
        }
    }
}

/// A site to index
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the site (e.g., "https://example.com")
    pub url: String,

    /// Display name of the site
    pub name: String,
}

impl SiteConfig {
    /// The site root in the form pages are compared against: trimmed,
    /// lowercased, without a trailing slash
    pub fn root_url(&self) -> String {
        crate::url::normalize_page_url(&self.url)
    }
}

fn default_pacing_delay_ms() -> u64 {
    150
}

fn default_stop_timeout_ms() -> u64 {
    60_000
}

fn default_max_concurrent_pages() -> u32 {
    8
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_common_lemma_percent() -> u32 {
    70
}

fn default_snippet_width() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_sites(urls: &[&str]) -> Config {
        Config {
            crawler: CrawlerConfig {
                user_agent: "TestBot".to_string(),
                referrer: None,
                pacing_delay_ms: 10,
                stop_timeout_ms: 1000,
                max_concurrent_pages: 4,
                request_timeout_secs: 5,
            },
            storage: StorageConfig {
                database_path: ":memory:".to_string(),
            },
            search: SearchConfig::default(),
            sites: urls
                .iter()
                .map(|u| SiteConfig {
                    url: u.to_string(),
                    name: format!("site {}", u),
                })
                .collect(),
        }
    }

    #[test]
    fn test_site_for_url_prefix_match() {
        let config = config_with_sites(&["https://example.com/", "https://other.org"]);
        let site = config.site_for_url("https://Example.com/news/1").unwrap();
        assert_eq!(site.url, "https://example.com/");

        let site = config.site_for_url("https://other.org").unwrap();
        assert_eq!(site.url, "https://other.org");
    }

    #[test]
    fn test_site_for_url_requires_boundary() {
        let config = config_with_sites(&["https://example.com"]);
        assert!(config.site_for_url("https://example.com.evil.org/page").is_none());
        assert!(config.site_for_url("https://unknown.net/page").is_none());
    }

    #[test]
    fn test_search_defaults() {
        let search = SearchConfig::default();
        assert_eq!(search.common_lemma_percent, 70);
        assert_eq!(search.snippet_width, 50);
    }
}
