//! URL handling module for Lexicrawl
//!
//! This module provides page URL normalization, href resolution, and the
//! helpers that relate a page URL to the site it belongs to.

mod normalize;

use crate::UrlResult;

// Re-export main functions
pub use normalize::{normalize_page_url, parse_http_url, resolve_href};

/// Returns the `scheme://host[:port]` part of a URL
///
/// This is the value sent as the `Referer` base for a site and the prefix
/// that page paths are appended to.
///
/// # Examples
///
/// ```
/// use lexicrawl::url::parent_link;
///
/// assert_eq!(parent_link("http://127.0.0.1:8080/a/b").unwrap(), "http://127.0.0.1:8080");
/// assert_eq!(parent_link("https://example.com/news").unwrap(), "https://example.com");
/// ```
pub fn parent_link(url: &str) -> UrlResult<String> {
    let parsed = parse_http_url(url)?;
    Ok(parsed.origin().ascii_serialization())
}

/// Returns the path of `url` relative to the site `root`
///
/// Both arguments are normalized before comparison. The root itself maps to
/// "/". A URL that is not under the root at a segment boundary yields `None`.
///
/// # Examples
///
/// ```
/// use lexicrawl::url::site_relative_path;
///
/// let root = "https://example.com";
/// assert_eq!(site_relative_path("https://example.com/", root).as_deref(), Some("/"));
/// assert_eq!(site_relative_path("https://example.com/a/b", root).as_deref(), Some("/a/b"));
/// assert_eq!(site_relative_path("https://example.org/a", root), None);
/// ```
pub fn site_relative_path(url: &str, root: &str) -> Option<String> {
    let url = normalize_page_url(url);
    let root = normalize_page_url(root);

    let rest = url.strip_prefix(root.as_str())?;
    if rest.is_empty() {
        Some("/".to_string())
    } else if rest.starts_with('/') {
        Some(rest.to_string())
    } else if rest.starts_with('?') {
        Some(format!("/{}", rest))
    } else {
        None
    }
}

/// Returns true if `url` lies under the site `root`
pub fn is_under_root(url: &str, root: &str) -> bool {
    site_relative_path(url, root).is_some()
}
