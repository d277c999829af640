//! Storage module for persisting catalog data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Product lookup, insert, update, and delete
//! - Atomic units spanning several writes
//! - The crawl run ledger

mod handle;
mod schema;
mod sqlite;
mod traits;

pub use handle::StorageHandle;
pub use sqlite::{init_database, SqliteStorage};
pub use traits::{in_transaction, Storage, StorageError, StorageResult};

use crate::SyncError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SyncError> {
    SqliteStorage::new(path)
}

/// A stored catalog record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    /// Surrogate key assigned on first insert; never changes afterwards
    pub id: i64,
    /// Display name; unique across the table
    pub name: String,
    /// Price text exactly as shown on the listing page
    pub price: String,
}

/// Represents a crawl run in the ledger
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Counters recorded for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub pages_fetched: u64,
    pub records_extracted: u64,
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
    /// Why the walk stopped (see `StopReason::as_str`)
    pub stop_reason: Option<String>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
