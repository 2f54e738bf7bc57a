//! State module for tracking indexing progress
//!
//! # Components
//!
//! - `SiteStatus`: Lifecycle of a site (indexing, indexed, failed, not found)

mod site_status;

pub use site_status::SiteStatus;
