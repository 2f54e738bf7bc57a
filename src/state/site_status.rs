//! Site status definitions for tracking indexing progress

use serde::Serialize;
use std::fmt;

/// Lifecycle status of a site in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SiteStatus {
    /// A crawl job for the site is running
    Indexing,

    /// The last crawl (or single-page index) completed
    Indexed,

    /// The last crawl was stopped or could not run
    Failed,

    /// The site is configured but has never been indexed
    #[serde(rename = "NOTFOUND")]
    NotFound,
}

impl SiteStatus {
    /// Returns true if the site can be searched
    pub fn is_searchable(&self) -> bool {
        matches!(self, Self::Indexed)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Indexing => "INDEXING",
            Self::Indexed => "INDEXED",
            Self::Failed => "FAILED",
            Self::NotFound => "NOTFOUND",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "INDEXING" => Some(Self::Indexing),
            "INDEXED" => Some(Self::Indexed),
            "FAILED" => Some(Self::Failed),
            "NOTFOUND" => Some(Self::NotFound),
            _ => None,
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
