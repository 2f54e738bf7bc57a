use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use lexicrawl::config::load_config;
///
/// let config = load_config(Path::new("lexicrawl.toml")).unwrap();
/// println!("Sites: {}", config.sites.len());
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
user-agent = "LexicrawlBot/0.1"
referrer = "https://www.google.com"
pacing-delay-ms = 200
max-concurrent-pages = 4

[storage]
database-path = "./test.db"

[search]
common-lemma-percent = 60

[[sites]]
url = "https://example.com"
name = "Example"

[[sites]]
url = "https://news.example.org/"
name = "News"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.user_agent, "LexicrawlBot/0.1");
        assert_eq!(config.crawler.pacing_delay_ms, 200);
        assert_eq!(config.crawler.max_concurrent_pages, 4);
        assert_eq!(config.crawler.stop_timeout_ms, 60_000);
        assert_eq!(config.search.common_lemma_percent, 60);
        assert_eq!(config.search.snippet_width, 50);
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites[1].name, "News");
    }

    #[test]
    fn test_defaults_when_sections_omitted() {
        let config = parse_config(
            r#"
[crawler]
user-agent = "Bot"

[storage]
database-path = "./test.db"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.pacing_delay_ms, 150);
        assert_eq!(config.crawler.request_timeout_secs, 30);
        assert!(config.crawler.referrer.is_none());
        assert!(config.sites.is_empty());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/lexicrawl.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let result = parse_config(
            r#"
[crawler]
user-agent = "Bot"
max-concurrent-pages = 0

[storage]
database-path = "./test.db"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unparseable_site_url_is_accepted_at_load() {
        let config = parse_config(
            r#"
[crawler]
user-agent = "Bot"

[storage]
database-path = "./test.db"

[[sites]]
url = "not a url"
name = "Broken"
"#,
        )
        .unwrap();
        assert_eq!(config.sites[0].url, "not a url");
    }
}
