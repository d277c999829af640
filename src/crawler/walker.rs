//! Crawl walker - follows a category's page chain
//!
//! Starting from the category URL, the walker fetches a page, extracts its
//! products, and follows the next-page link until one of:
//! - a page has no next-page link (the normal end)
//! - a fetch fails (non-200 or transport error)
//! - a next-page link points back at a page already visited
//! - the configured page ceiling is reached
//!
//! Records gathered before the stop are always returned.

use crate::config::CrawlerConfig;
use crate::crawler::extractor::{parse_listing, ScrapedProduct};
use crate::crawler::fetcher::{fetch_page, FetchResult, Transport};
use reqwest::header::HeaderMap;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Why a walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last page had no next-page link
    Exhausted,

    /// A page fetch failed
    FetchFailed { url: String, reason: String },

    /// A next-page link pointed at a page already visited in this walk
    CycleDetected { url: String },

    /// The page ceiling was reached with a next-page link still pending
    PageLimit { limit: usize },

    /// A fetched page could not be parsed
    ParseFailed { url: String, reason: String },
}

impl StopReason {
    /// Short tag stored in the run ledger
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::FetchFailed { .. } => "fetch-failed",
            Self::CycleDetected { .. } => "cycle-detected",
            Self::PageLimit { .. } => "page-limit",
            Self::ParseFailed { .. } => "parse-failed",
        }
    }
}

/// Result of a single walk over the page chain
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// All products in traversal order
    pub records: Vec<ScrapedProduct>,
    pub pages_fetched: usize,
    /// Listing blocks dropped by the extractor
    pub skipped: usize,
    pub stop: StopReason,
}

/// Drives the fetcher and extractor across a page chain
pub struct CrawlWalker<T> {
    transport: T,
    headers: HeaderMap,
    base_url: Url,
    page_delay: Duration,
    max_pages: usize,
}

impl<T: Transport> CrawlWalker<T> {
    /// Creates a walker
    ///
    /// # Arguments
    ///
    /// * `transport` - Outbound GET primitive
    /// * `headers` - Fixed header set sent with every page request
    /// * `base_url` - Site origin for resolving next-page links
    pub fn new(transport: T, headers: HeaderMap, base_url: Url) -> Self {
        Self {
            transport,
            headers,
            base_url,
            page_delay: Duration::ZERO,
            max_pages: usize::MAX,
        }
    }

    /// Creates a walker with delay and ceiling taken from the crawler config
    pub fn from_config(
        transport: T,
        headers: HeaderMap,
        config: &CrawlerConfig,
    ) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self::new(transport, headers, base_url)
            .with_page_delay(Duration::from_millis(config.page_delay_ms))
            .with_max_pages(config.max_pages))
    }

    /// Pause between consecutive page fetches
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Hard ceiling on pages fetched per walk
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Walks the chain and returns the accumulated products
    pub async fn run(&self, start_url: &str) -> Vec<ScrapedProduct> {
        self.walk(start_url).await.records
    }

    /// Walks the chain starting at `start_url`
    pub async fn walk(&self, start_url: &str) -> WalkOutcome {
        let mut records = Vec::new();
        let mut visited = HashSet::new();
        let mut pages_fetched = 0;
        let mut skipped = 0;
        let mut current_url = start_url.to_string();

        let stop = loop {
            if !visited.insert(visit_key(&current_url)) {
                break StopReason::CycleDetected { url: current_url };
            }

            if pages_fetched >= self.max_pages {
                break StopReason::PageLimit {
                    limit: self.max_pages,
                };
            }

            tracing::debug!("Fetching listing page: {}", current_url);
            let body = match fetch_page(&self.transport, &current_url, &self.headers).await {
                FetchResult::Success { body } => body,
                failure => {
                    let reason = failure.failure_reason().unwrap_or_default();
                    break StopReason::FetchFailed {
                        url: current_url,
                        reason,
                    };
                }
            };
            pages_fetched += 1;

            let listing = match parse_listing(&body, &self.base_url) {
                Ok(listing) => listing,
                Err(reason) => {
                    break StopReason::ParseFailed {
                        url: current_url,
                        reason,
                    }
                }
            };

            if pages_fetched == 1 && listing.products.is_empty() {
                tracing::warn!("First page {} yielded no products", current_url);
            }
            tracing::debug!(
                "Page {} yielded {} products ({} skipped)",
                pages_fetched,
                listing.products.len(),
                listing.skipped
            );

            skipped += listing.skipped;
            records.extend(listing.products);

            match listing.next_url {
                Some(next_url) => {
                    if !self.page_delay.is_zero() {
                        tokio::time::sleep(self.page_delay).await;
                    }
                    current_url = next_url;
                }
                None => break StopReason::Exhausted,
            }
        };

        match &stop {
            StopReason::Exhausted => {}
            StopReason::FetchFailed { url, reason } | StopReason::ParseFailed { url, reason } => {
                tracing::warn!("Walk stopped at {}: {}", url, reason)
            }
            StopReason::CycleDetected { url } => {
                tracing::warn!("Walk stopped: next-page link cycles back to {}", url)
            }
            StopReason::PageLimit { limit } => {
                tracing::warn!("Walk stopped after reaching the {} page limit", limit)
            }
        }

        WalkOutcome {
            records,
            pages_fetched,
            skipped,
            stop,
        }
    }
}

/// Identity of a page for cycle detection; fragments do not make a new page
fn visit_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
