//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building HTTP clients with the configured user agent and referrer
//! - A probe request that does not follow redirects, used for the status code
//! - A document request that follows redirects, used for the stored markup
//! - Error classification into what gets recorded on the site row

use crate::config::CrawlerConfig;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::fmt;
use std::time::Duration;

/// Maximum redirect hops followed by the document client
const MAX_REDIRECTS: usize = 10;

/// A page body fetched by the document client
#[derive(Debug)]
pub struct FetchedDocument {
    /// Final URL after redirects
    pub final_url: String,
    /// Page body content
    pub body: String,
}

/// Why a fetch did not produce a usable response
///
/// The Display form is what gets recorded as a site's last error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a client or server error status
    Http {
        /// The HTTP status code
        status_code: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// No response (connection refused, timeout, TLS failure, body read error)
    Network {
        /// Error description
        error: String,
    },
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http {
                status_code,
                reason,
            } => write!(f, "{} {}", status_code, reason),
            Self::Network { error } => f.write_str(error),
        }
    }
}

impl FetchFailure {
    fn from_status(status: StatusCode) -> Self {
        Self::Http {
            status_code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    fn from_error(e: reqwest::Error) -> Self {
        let error = if e.is_timeout() {
            "Request timeout".to_string()
        } else if e.is_connect() {
            "Connection refused".to_string()
        } else {
            e.to_string()
        };
        Self::Network { error }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent, referrer, timeout)
/// * `redirects` - Redirect policy for this client
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig, redirects: Policy) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Some(referrer) = &config.referrer {
        match HeaderValue::from_str(referrer) {
            Ok(value) => {
                headers.insert(REFERER, value);
            }
            Err(e) => tracing::warn!("Ignoring unusable referrer {}: {}", referrer, e),
        }
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirects)
        .gzip(true)
        .brotli(true)
        .build()
}

/// The pair of clients used to visit a page
#[derive(Debug, Clone)]
pub struct Fetcher {
    probe: Client,
    document: Client,
}

impl Fetcher {
    /// Builds the probe and document clients from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            probe: build_http_client(config, Policy::none())?,
            document: build_http_client(config, Policy::limited(MAX_REDIRECTS))?,
        })
    }

    /// Requests a URL without following redirects
    ///
    /// # Returns
    ///
    /// * `Ok(u16)` - The status code of a non-error response (redirects included)
    /// * `Err(FetchFailure)` - An error status or a network failure
    pub async fn probe(&self, url: &str) -> Result<u16, FetchFailure> {
        let response = self
            .probe
            .get(url)
            .send()
            .await
            .map_err(FetchFailure::from_error)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchFailure::from_status(status));
        }
        Ok(status.as_u16())
    }

    /// Fetches the document at a URL, following redirects
    pub async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, FetchFailure> {
        let response = self
            .document
            .get(url)
            .send()
            .await
            .map_err(FetchFailure::from_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::from_status(status));
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(FetchFailure::from_error)?;

        Ok(FetchedDocument {
            final_url,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> CrawlerConfig {
        CrawlerConfig {
            user_agent: "TestCrawler/1.0".to_string(),
            referrer: Some("https://www.google.com".to_string()),
            pacing_delay_ms: 10,
            stop_timeout_ms: 1000,
            max_concurrent_pages: 4,
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_build_fetcher() {
        assert!(Fetcher::new(&create_test_config()).is_ok());
    }

    #[test]
    fn test_failure_display() {
        let failure = FetchFailure::from_status(StatusCode::NOT_FOUND);
        assert_eq!(failure.to_string(), "404 Not Found");

        let failure = FetchFailure::Network {
            error: "Connection refused".to_string(),
        };
        assert_eq!(failure.to_string(), "Connection refused");
    }
}
