//! Shared storage handle
//!
//! The crawl pipeline and the request layer both hold a clone of the same
//! handle. Each operation acquires the connection, runs, and releases it
//! before the caller reaches its next suspension point.

use crate::storage::traits::{in_transaction, Storage, StorageError};
use crate::storage::SqliteStorage;
use std::sync::{Arc, Mutex};

/// Cloneable handle to a storage backend
pub struct StorageHandle<S = SqliteStorage> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for StorageHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Storage> StorageHandle<S> {
    pub fn new(storage: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    /// Runs `f` with exclusive access to the storage
    pub fn with<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce(&mut S) -> Result<T, E>,
    {
        let mut guard = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        f(&mut *guard)
    }

    /// Runs `f` as a single atomic unit with exclusive access to the storage
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce(&mut S) -> Result<T, E>,
    {
        self.with(|storage| in_transaction(storage, f))
    }
}
