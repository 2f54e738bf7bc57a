//! Output module for reporting on the index
//!
//! This module handles loading and printing per-site statistics.

pub mod stats;

pub use stats::{load_statistics, print_statistics, SiteStatistics, StatisticsSnapshot};
