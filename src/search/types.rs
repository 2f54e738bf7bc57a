/// One ranked page
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Root URL of the site the page belongs to
    pub site: String,
    pub site_name: String,
    /// Site-relative path of the page
    pub uri: String,
    pub title: String,
    pub snippet: String,
    /// Relevance normalized to the best page of its site, in `[0, 1]`
    pub relevance: f64,
}

/// Ranked results of a query across every eligible site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    /// Number of results; always `items.len()`
    pub count: usize,
    pub items: Vec<SearchResult>,
}

impl SearchResults {
    pub fn new(items: Vec<SearchResult>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
