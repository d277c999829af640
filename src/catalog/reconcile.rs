//! Batch reconciliation of scraped records into storage
//!
//! For each scraped record, matched by name:
//! - stored with the same price: left alone
//! - stored with a different price: price replaced, id and name kept
//! - not stored: inserted with a fresh id
//!
//! Stored records missing from the batch are never touched. The whole batch
//! is one atomic unit.

use crate::crawler::ScrapedProduct;
use crate::storage::{in_transaction, Storage, StorageResult};

/// Counts of what a reconciliation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ReconcileReport {
    /// True when the batch wrote anything
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.updated > 0
    }
}

/// Applies a scraped batch to storage as a single atomic unit
///
/// A name that appears more than once in the batch resolves to its last
/// occurrence, matching last-write-wins for crawl updates.
pub fn apply_batch<S: Storage + ?Sized>(
    storage: &mut S,
    batch: &[ScrapedProduct],
) -> StorageResult<ReconcileReport> {
    in_transaction(storage, |storage| {
        let mut report = ReconcileReport::default();

        for record in batch {
            match storage.get_product_by_name(&record.name)? {
                Some(existing) if existing.price == record.price => report.unchanged += 1,
                Some(existing) => {
                    storage.update_price(existing.id, &record.price)?;
                    report.updated += 1;
                }
                None => {
                    storage.insert_product(&record.name, &record.price)?;
                    report.inserted += 1;
                }
            }
        }

        Ok(report)
    })
}
