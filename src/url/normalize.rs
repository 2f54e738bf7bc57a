use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a page URL into the form used for comparisons and storage keys
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Strip one trailing slash
/// 3. Lowercase the whole URL
///
/// # Examples
///
/// ```
/// use lexicrawl::url::normalize_page_url;
///
/// assert_eq!(normalize_page_url(" https://Example.com/News/ "), "https://example.com/news");
/// ```
pub fn normalize_page_url(url: &str) -> String {
    let trimmed = url.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.to_lowercase()
}

/// Resolves an `href` found on a page into a normalized absolute URL
///
/// Anchors, hrefs without any '/', and schemes other than HTTP(S) are
/// discarded. Relative references are joined onto the URL of the page
/// they were found on.
///
/// # Arguments
///
/// * `href` - The raw attribute value
/// * `base` - URL of the page containing the link
///
/// # Returns
///
/// * `Some(String)` - The resolved, normalized URL
/// * `None` - The link is not followable
pub fn resolve_href(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.contains('#') || !href.contains('/') {
        return None;
    }

    let base = Url::parse(base).ok()?;
    let resolved = base.join(href).ok()?;

    match resolved.scheme() {
        "http" | "https" => Some(normalize_page_url(resolved.as_str())),
        _ => None,
    }
}

/// Parses a URL and checks it is usable as a crawl target
pub fn parse_http_url(url: &str) -> UrlResult<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(parsed)
}
