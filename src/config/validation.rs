use crate::config::types::{Config, CrawlerConfig, SearchConfig, SiteConfig, StorageConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
///
/// Site URLs are only checked for presence here. A site whose URL does not
/// parse fails its own crawl job when indexing starts, and the remaining
/// sites are still indexed.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_search_config(&config.search)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(referrer) = &config.referrer {
        Url::parse(referrer)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referrer: {}", e)))?;
    }

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 100, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.stop_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "stop-timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> ConfigResult<()> {
    if config.common_lemma_percent < 1 || config.common_lemma_percent > 100 {
        return Err(ConfigError::Validation(format!(
            "common-lemma-percent must be between 1 and 100, got {}",
            config.common_lemma_percent
        )));
    }

    if config.snippet_width == 0 {
        return Err(ConfigError::Validation(
            "snippet-width must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates site entries
fn validate_sites(sites: &[SiteConfig]) -> ConfigResult<()> {
    for site in sites {
        if site.url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must have a URL",
                site.name
            )));
        }

        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must have a name",
                site.url
            )));
        }
    }

    for (i, site) in sites.iter().enumerate() {
        if sites[..i].iter().any(|s| s.root_url() == site.root_url()) {
            return Err(ConfigError::Validation(format!(
                "Site URL '{}' is listed more than once",
                site.url
            )));
        }
    }

    Ok(())
}
