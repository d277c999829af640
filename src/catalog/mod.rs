//! Catalog operations
//!
//! Reconciliation of crawled batches plus the direct create/read/update/delete
//! operations a request layer exposes. Every operation runs as one atomic unit
//! against the shared storage handle and announces itself to the notifier.

mod reconcile;
mod service;

pub use reconcile::{apply_batch, ReconcileReport};
pub use service::CatalogService;

use crate::storage::StorageError;
use thiserror::Error;

/// Errors surfaced by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(i64),

    #[error("Product name already exists: {0}")]
    Conflict(String),

    #[error("Invalid product: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Partial update of a stored product; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<String>,
}

impl ProductUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            price: None,
        }
    }

    pub fn price(price: impl Into<String>) -> Self {
        Self {
            name: None,
            price: Some(price.into()),
        }
    }
}
