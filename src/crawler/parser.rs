//! HTML parser for extracting followable links
//!
//! This module handles parsing HTML content to find the links a crawl task
//! expands into: `<a href>` targets on the same site as the page.

use crate::url::{is_under_root, resolve_href};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts raw `href` values from `<a>` tags
///
/// Anchors carrying the `download` attribute are skipped.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Extracts the links a page should expand into
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - Anchors (any href containing '#') and hrefs without a '/'
/// - `javascript:`, `mailto:`, `tel:`, `data:` and other non-HTTP(S) targets
/// - Targets outside the site root
/// - The page itself
/// - Repeats of a link already returned
///
/// # Arguments
///
/// * `html` - The page markup
/// * `page_url` - URL of the page, used to resolve relative hrefs
/// * `root_url` - The site root that links must stay under
///
/// # Returns
///
/// Normalized absolute URLs in document order
pub fn extract_site_links(html: &str, page_url: &str, root_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let page = crate::url::normalize_page_url(page_url);

    extract_hrefs(html)
        .iter()
        .filter_map(|href| resolve_href(href, page_url))
        .filter(|link| *link != page && is_under_root(link, root_url))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
