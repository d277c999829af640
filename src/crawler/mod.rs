//! Crawler module for walking a paginated catalog
//!
//! This module contains the crawl pipeline, including:
//! - Page fetching behind a swappable transport
//! - Product extraction from listing pages
//! - Following the next-page chain
//! - Periodic scheduling of crawl-and-reconcile cycles

mod extractor;
mod fetcher;
mod scheduler;
mod walker;

pub use extractor::{parse_listing, ParsedListing, ScrapedProduct, MISSING_PRICE};
pub use fetcher::{
    build_headers, build_http_client, fetch_page, FetchResult, HttpTransport, Transport,
    TransportError, TransportResponse, DEFAULT_USER_AGENT,
};
pub use scheduler::{CycleReport, Scheduler, SchedulerHandle};
pub use walker::{CrawlWalker, StopReason, WalkOutcome};

use crate::config::Config;
use crate::SyncError;

/// Builds a walker that talks HTTP with the configured client and headers
pub fn http_walker(config: &Config) -> Result<CrawlWalker<HttpTransport>, SyncError> {
    let transport = HttpTransport::from_config(&config.http)?;
    let headers = build_headers(&config.http)?;
    Ok(CrawlWalker::from_config(transport, headers, &config.crawler)?)
}
