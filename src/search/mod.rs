//! Search module
//!
//! Turns a query into its lemma set, intersects the pages containing every
//! lemma rarest first, ranks them by summed weight normalized per site, and
//! annotates each page with a title and highlighted snippet.

mod engine;
mod snippet;
mod types;

pub use engine::SearchEngine;
pub use snippet::{build_snippet, extract_title, SNIPPET_SEPARATOR, UNTITLED};
pub use types::{SearchResult, SearchResults};
