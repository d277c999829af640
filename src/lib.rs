//! Catalog-Sync: a periodic catalog crawler with live change notifications
//!
//! This crate walks a paginated product catalog on a retail website, extracts
//! product records from each listing page, and reconciles them into a SQLite
//! store. Direct edits go through the same store, and every read or mutation is
//! announced to connected listeners.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod notifier;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Catalog-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// Result type alias for Catalog-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{CatalogService, ProductUpdate, ReconcileReport};
pub use config::Config;
pub use crawler::{CrawlWalker, HttpTransport, ScrapedProduct, Scheduler};
pub use notifier::{ChangeEvent, ChannelSubscriber, Notifier};
pub use storage::{ProductRecord, SqliteStorage, StorageHandle};
