//! End-to-end tests against mock sites served by wiremock

mod common;
mod crawl_tests;
mod indexing_tests;
mod search_tests;
