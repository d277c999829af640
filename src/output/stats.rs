//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! crawl ledger statistics from the storage layer.

use crate::storage::{RunRecord, RunStatus, RunTotals, Storage, StorageResult};
use std::collections::HashMap;

/// Catalog and crawl ledger summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Products currently stored
    pub total_products: u64,

    /// Count of crawl runs by status
    pub runs_by_status: HashMap<RunStatus, u64>,

    /// Counters summed over all finished runs
    pub totals: RunTotals,

    /// Most recently started run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    pub fn total_runs(&self) -> u64 {
        self.runs_by_status.values().sum()
    }
}

/// Loads statistics from storage
pub fn load_statistics<S: Storage + ?Sized>(storage: &S) -> StorageResult<CrawlStatistics> {
    let total_products = storage.count_products()?;

    let mut runs_by_status = HashMap::new();
    for status in [
        RunStatus::Running,
        RunStatus::Completed,
        RunStatus::Interrupted,
        RunStatus::Failed,
    ] {
        let count = storage.count_runs_by_status(status)?;
        if count > 0 {
            runs_by_status.insert(status, count);
        }
    }

    Ok(CrawlStatistics {
        total_products,
        runs_by_status,
        totals: storage.sum_run_totals()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Wall-clock duration of a finished run
pub fn run_duration_seconds(run: &RunRecord) -> Option<i64> {
    let started = run.started_at.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
    let finished = run
        .finished_at
        .as_ref()?
        .parse::<chrono::DateTime<chrono::Utc>>()
        .ok()?;
    Some((finished - started).num_seconds())
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Products stored: {}", stats.total_products);
    println!("  Crawl runs: {}", stats.total_runs());
    println!();

    println!("Runs by Status:");
    let mut status_counts: Vec<_> = stats.runs_by_status.iter().collect();
    status_counts.sort_by(|a, b| b.1.cmp(a.1));
    for (status, count) in status_counts {
        println!("  {}: {}", status.to_db_string(), count);
    }
    println!();

    println!("Totals Across Finished Runs:");
    println!("  Pages fetched: {}", stats.totals.pages_fetched);
    println!("  Records extracted: {}", stats.totals.records_extracted);
    println!("  Inserted: {}", stats.totals.inserted);
    println!("  Updated: {}", stats.totals.updated);
    println!("  Unchanged: {}", stats.totals.unchanged);
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run (#{}):", run.id);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        if let Some(seconds) = run_duration_seconds(run) {
            println!("  Duration: {}s", seconds);
        }
        if let Some(reason) = &run.totals.stop_reason {
            println!("  Stop reason: {}", reason);
        }
        println!(
            "  Pages: {}, records: {}, inserted: {}, updated: {}",
            run.totals.pages_fetched,
            run.totals.records_extracted,
            run.totals.inserted,
            run.totals.updated
        );
    } else {
        println!("No crawl runs recorded yet.");
    }
}
