//! Crawler module for fetching and ingesting the remote catalog
//!
//! This module contains the core pipeline, including:
//! - HTTP fetching with pacing
//! - HTML extraction of links and product records
//! - Ingest coordination over the category hierarchy
//! - The per-run report

mod coordinator;
mod extractor;
mod fetcher;
mod report;

pub use coordinator::Coordinator;
pub use extractor::{
    compile_selector, extract_category_links, extract_links, extract_products,
    extract_subcategory_links, url_in_style, LinkSelectors, ProductDraft, ProductSelectors,
};
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpFetcher, PageSource};
pub use report::{CrawlReport, FailureStage, PageFailure};

use crate::config::Config;
use crate::storage::open_catalog;
use crate::IngestError;
use std::path::Path;

/// Runs a complete ingest against the live site
///
/// This is the main entry point for a run. It will:
/// 1. Open the catalog database
/// 2. Build the paced HTTP fetcher
/// 3. Walk the site and ingest every product found
/// 4. Record the run in the run log
///
/// # Arguments
///
/// * `config` - The pipeline configuration
/// * `config_hash` - Hash of the configuration source, stored with the run
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The walk completed; the report may list isolated failures
/// * `Err(IngestError)` - Setup failed or the entry page could not be read
///
/// # Example
///
/// ```no_run
/// use catalog_ingest::config::Config;
/// use catalog_ingest::crawler::run_ingest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_ingest(&Config::default(), "defaults").await?;
/// println!("{} products created", report.products_created);
/// # Ok(())
/// # }
/// ```
pub async fn run_ingest(config: &Config, config_hash: &str) -> Result<CrawlReport, IngestError> {
    let store = open_catalog(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::new(&config.fetcher)?;

    let mut coordinator = Coordinator::new(config, fetcher, store)?;
    coordinator.run_logged(config_hash).await
}
