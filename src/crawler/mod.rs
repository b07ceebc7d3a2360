//! Crawler module for listing discovery and page harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Pagination probing
//! - User card extraction
//! - Overall crawl coordination under a concurrency ceiling

mod coordinator;
mod extractor;
mod fetcher;
mod prober;

pub use coordinator::{Coordinator, CrawlOutcome, RunReport};
pub use extractor::{MarkupSelectors, PageExtraction, PageExtractor};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use prober::{max_page_number, PaginationProber, MIN_PAGE_COUNT};

use crate::config::Config;
use crate::RosterError;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client
/// 2. Probe the listing for its page count
/// 3. Fetch and extract every page in the capped range
/// 4. Write the records to the configured output file
///
/// # Arguments
///
/// * `config` - The harvester configuration
///
/// # Returns
///
/// * `Ok(RunReport)` - Run completed and the output file was written
/// * `Err(RosterError)` - Run failed; no output was written after a crawl failure
pub async fn harvest(config: Config) -> Result<RunReport, RosterError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
