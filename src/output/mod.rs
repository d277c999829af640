//! Output module for printing catalog contents and crawl reports
//!
//! This module handles:
//! - Crawl ledger statistics
//! - Product listings
//! - Per-cycle and dry-run reports

pub mod stats;

pub use stats::{load_statistics, print_statistics, run_duration_seconds, CrawlStatistics};

use crate::crawler::{CycleReport, ScrapedProduct, WalkOutcome};
use crate::storage::ProductRecord;

/// Prints stored products as an id/name/price table
pub fn print_products(products: &[ProductRecord]) {
    if products.is_empty() {
        println!("No products stored.");
        return;
    }

    let name_width = products
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    println!("{:>6}  {:<width$}  Price", "Id", "Name", width = name_width);
    for product in products {
        println!(
            "{:>6}  {:<width$}  {}",
            product.id,
            product.name,
            display_price(&product.price),
            width = name_width
        );
    }
    println!("\n{} products", products.len());
}

/// Prints the result of a single crawl cycle
pub fn print_cycle_report(report: &CycleReport) {
    println!("=== Crawl Cycle (run {}) ===\n", report.run_id);
    println!("  Status: {}", report.status.to_db_string());
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Records extracted: {}", report.records_extracted);
    if report.skipped > 0 {
        println!("  Listings skipped: {}", report.skipped);
    }
    if let Some(stop) = &report.stop {
        println!("  Stopped: {}", stop.as_str());
    }
    match &report.reconcile {
        Some(reconcile) => println!(
            "  Inserted: {}, updated: {}, unchanged: {}",
            reconcile.inserted, reconcile.updated, reconcile.unchanged
        ),
        None => println!("  Nothing reconciled"),
    }
}

/// Prints what a walk extracted without touching storage
pub fn print_walk_outcome(outcome: &WalkOutcome) {
    for ScrapedProduct { name, price } in &outcome.records {
        println!("{}\t{}", name, display_price(price));
    }
    println!(
        "\n{} records from {} pages ({} skipped), stopped: {}",
        outcome.records.len(),
        outcome.pages_fetched,
        outcome.skipped,
        outcome.stop.as_str()
    );
}

fn display_price(price: &str) -> &str {
    if price.is_empty() {
        "-"
    } else {
        price
    }
}
