//! Crawler module for listing export
//!
//! This module contains the core export logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - Bounded retry around each page fetch
//! - HTML parsing and table extraction into CSV fragments
//! - The pagination walk that stitches fragments into one export

mod coordinator;
mod fetcher;
mod parser;
mod retry;
mod table;

#[cfg(test)]
mod test_support;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, CrawlSession};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use parser::{parse_selector, text_of, HtmlParser, ScraperParser, TableDocument};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use table::{
    cleanup_csv, clean_body_cell, clean_header_cell, extract_table, quote_cell, CsvFragment,
    ListKind, TableTarget,
};

use crate::config::Config;
use crate::ExportError;
use url::Url;

/// Runs a complete export crawl
///
/// This is the main entry point for an export. It will:
/// 1. Build the HTTP client
/// 2. Redirect a fake starting URL to the real first page
/// 3. Fetch pages in order, extracting the table on each
/// 4. Stop when the next-page link disappears or a page keeps failing
///
/// # Arguments
///
/// * `config` - The export configuration
/// * `location` - The listing URL to start from
/// * `target` - The table to extract on every page
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The accumulated export, possibly partial
/// * `Err(ExportError)` - The crawl could not be set up
pub async fn crawl(
    config: &Config,
    location: &Url,
    target: &TableTarget,
) -> Result<CrawlReport, ExportError> {
    run_crawl(config, location, target).await
}
