//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{ProductRecord, RunRecord, RunStatus, RunTotals};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Product names are unique: inserting or renaming onto a name that is
/// already stored fails with [`StorageError::ConstraintViolation`].
pub trait Storage {
    // ===== Transactions =====

    /// Opens an atomic unit; writes stay invisible until [`Storage::commit`]
    fn begin(&mut self) -> StorageResult<()>;

    fn commit(&mut self) -> StorageResult<()>;

    fn rollback(&mut self) -> StorageResult<()>;

    // ===== Product Management =====

    /// Gets a product by its surrogate ID
    fn get_product(&self, id: i64) -> StorageResult<Option<ProductRecord>>;

    /// Gets a product by its name (the natural merge key)
    fn get_product_by_name(&self, name: &str) -> StorageResult<Option<ProductRecord>>;

    /// Inserts a new product and returns its assigned ID
    fn insert_product(&mut self, name: &str, price: &str) -> StorageResult<i64>;

    /// Replaces the price of an existing product
    fn update_price(&mut self, id: i64, price: &str) -> StorageResult<()>;

    /// Replaces both fields of an existing product
    fn update_product(&mut self, id: i64, name: &str, price: &str) -> StorageResult<()>;

    /// Deletes a product, returning whether a row was removed
    fn delete_product(&mut self, id: i64) -> StorageResult<bool>;

    /// Lists all products ordered by ID
    fn list_products(&self) -> StorageResult<Vec<ProductRecord>>;

    fn count_products(&self) -> StorageResult<u64>;

    // ===== Run Ledger =====

    /// Creates a new crawl run in the `Running` state
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records the outcome of a run and stamps its finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus, totals: &RunTotals)
        -> StorageResult<()>;

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Counts runs by status
    fn count_runs_by_status(&self, status: RunStatus) -> StorageResult<u64>;

    /// Sums the per-run totals across all finished runs
    fn sum_run_totals(&self) -> StorageResult<RunTotals>;
}

/// Runs `f` as one atomic unit: commits on success, rolls back on error
///
/// The rollback error, if any, is logged and the error from `f` or commit is returned.
pub fn in_transaction<S, T, E, F>(storage: &mut S, f: F) -> Result<T, E>
where
    S: Storage + ?Sized,
    E: From<StorageError>,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    storage.begin()?;
    let result = f(storage).and_then(|value| storage.commit().map(|_| value).map_err(E::from));
    if result.is_err() {
        if let Err(rollback_err) = storage.rollback() {
            tracing::error!("Rollback failed: {}", rollback_err);
        }
    }
    result
}
