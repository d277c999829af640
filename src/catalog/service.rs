use crate::catalog::reconcile::{apply_batch, ReconcileReport};
use crate::catalog::{CatalogError, ProductUpdate};
use crate::crawler::ScrapedProduct;
use crate::notifier::{ChangeEvent, Notifier};
use crate::storage::{ProductRecord, SqliteStorage, Storage, StorageError, StorageHandle};

type CatalogResult<T> = Result<T, CatalogError>;

/// Request-facing view of the catalog
///
/// Holds the same storage handle the crawl pipeline writes through, so direct
/// edits and reconciliation never interleave inside one atomic unit.
pub struct CatalogService<S = SqliteStorage> {
    storage: StorageHandle<S>,
    notifier: Notifier,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

fn conflict_on_duplicate(e: StorageError, name: &str) -> CatalogError {
    match e {
        StorageError::ConstraintViolation(_) => CatalogError::Conflict(name.to_string()),
        other => CatalogError::Storage(other),
    }
}

fn require_name(name: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::Invalid("name must not be empty".to_string()));
    }
    Ok(())
}

impl<S: Storage> CatalogService<S> {
    pub fn new(storage: StorageHandle<S>, notifier: Notifier) -> Self {
        Self { storage, notifier }
    }

    pub fn storage(&self) -> &StorageHandle<S> {
        &self.storage
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// All stored products, ordered by id
    pub fn list(&self) -> CatalogResult<Vec<ProductRecord>> {
        let products = self.storage.with(|s| s.list_products())?;
        self.notifier.publish(&ChangeEvent::Listed {
            count: products.len(),
        });
        Ok(products)
    }

    pub fn get(&self, id: i64) -> CatalogResult<ProductRecord> {
        let product = self
            .storage
            .with(|s| s.get_product(id))?
            .ok_or(CatalogError::NotFound(id))?;
        self.notifier.publish(&ChangeEvent::Viewed {
            id: product.id,
            name: product.name.clone(),
        });
        Ok(product)
    }

    pub fn create(&self, name: &str, price: &str) -> CatalogResult<ProductRecord> {
        require_name(name)?;

        let id = self.storage.transaction(|s| {
            if s.get_product_by_name(name)?.is_some() {
                return Err(CatalogError::Conflict(name.to_string()));
            }
            s.insert_product(name, price)
                .map_err(|e| conflict_on_duplicate(e, name))
        })?;

        let product = ProductRecord {
            id,
            name: name.to_string(),
            price: price.to_string(),
        };
        tracing::debug!("Created product {} ({})", product.id, product.name);
        self.notifier.publish(&ChangeEvent::Created {
            id: product.id,
            name: product.name.clone(),
            price: product.price.clone(),
        });
        Ok(product)
    }

    /// Applies the supplied fields of `update`; the id never changes
    pub fn update(&self, id: i64, update: ProductUpdate) -> CatalogResult<ProductRecord> {
        if let Some(name) = &update.name {
            require_name(name)?;
        }

        let product = self.storage.transaction(|s| {
            let existing = s.get_product(id)?.ok_or(CatalogError::NotFound(id))?;
            let name = update.name.unwrap_or(existing.name);
            let price = update.price.unwrap_or(existing.price);

            if let Some(other) = s.get_product_by_name(&name)? {
                if other.id != id {
                    return Err(CatalogError::Conflict(name));
                }
            }
            s.update_product(id, &name, &price)
                .map_err(|e| conflict_on_duplicate(e, &name))?;

            Ok(ProductRecord { id, name, price })
        })?;

        self.notifier.publish(&ChangeEvent::Updated {
            id: product.id,
            name: product.name.clone(),
            price: product.price.clone(),
        });
        Ok(product)
    }

    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        let removed = self.storage.with(|s| s.delete_product(id))?;
        if !removed {
            return Err(CatalogError::NotFound(id));
        }
        self.notifier.publish(&ChangeEvent::Deleted { id });
        Ok(())
    }

    /// Reconciles a crawled batch; listeners hear about it only if it changed something
    pub fn sync(&self, batch: &[ScrapedProduct]) -> CatalogResult<ReconcileReport> {
        let report = self.storage.with(|s| apply_batch(s, batch))?;
        if report.changed() {
            self.notifier.publish(&ChangeEvent::Synced {
                inserted: report.inserted,
                updated: report.updated,
            });
        }
        Ok(report)
    }
}
