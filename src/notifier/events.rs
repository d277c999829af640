//! Human-readable change events

use std::fmt;

/// Something that happened to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Listed { count: usize },
    Viewed { id: i64, name: String },
    Created { id: i64, name: String, price: String },
    Updated { id: i64, name: String, price: String },
    Deleted { id: i64 },
    Synced { inserted: usize, updated: usize },
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listed { count } => write!(f, "Listed {} products", count),
            Self::Viewed { id, name } => write!(f, "Viewed product {} ({})", id, name),
            Self::Created { id, name, price } => {
                write!(f, "Created product {}: {} at {}", id, name, price)
            }
            Self::Updated { id, name, price } => {
                write!(f, "Updated product {}: {} at {}", id, name, price)
            }
            Self::Deleted { id } => write!(f, "Deleted product {}", id),
            Self::Synced { inserted, updated } => write!(
                f,
                "Catalog sync: {} inserted, {} updated",
                inserted, updated
            ),
        }
    }
}
