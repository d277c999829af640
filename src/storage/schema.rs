//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Catalog-Sync database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Reconciled catalog records, one row per product name
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    price TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);

-- Ledger of scheduled crawl cycles
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL DEFAULT 0,
    records_extracted INTEGER NOT NULL DEFAULT 0,
    inserted INTEGER NOT NULL DEFAULT 0,
    updated INTEGER NOT NULL DEFAULT 0,
    unchanged INTEGER NOT NULL DEFAULT 0,
    stop_reason TEXT
);

CREATE INDEX IF NOT EXISTS idx_crawl_runs_status ON crawl_runs(status);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
