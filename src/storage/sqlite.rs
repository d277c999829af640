//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ProductRecord, RunRecord, RunStatus, RunTotals};
use crate::SyncError;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const PRODUCT_COLUMNS: &str = "id, name, price";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, pages_fetched, \
     records_extracted, inserted, updated, unchanged, stop_reason";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file and ensures the schema exists
    pub fn new(path: &Path) -> Result<Self, SyncError> {
        let conn = init_database(path).map_err(StorageError::from)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    ///
    /// Nothing survives the process; unit tests run against this.
    pub fn new_in_memory() -> Result<Self, SyncError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        initialize_schema(&conn).map_err(StorageError::from)?;
        Ok(Self { conn })
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    Ok(ProductRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
        totals: RunTotals {
            pages_fetched: row.get::<_, i64>(5)? as u64,
            records_extracted: row.get::<_, i64>(6)? as u64,
            inserted: row.get::<_, i64>(7)? as u64,
            updated: row.get::<_, i64>(8)? as u64,
            unchanged: row.get::<_, i64>(9)? as u64,
            stop_reason: row.get(10)?,
        },
    })
}

/// Maps unique-constraint failures to `ConstraintViolation`, everything else passes through
fn map_write_error(e: rusqlite::Error, name: &str) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            StorageError::ConstraintViolation(format!("product name '{}' already exists", name))
        }
        _ => StorageError::Sqlite(e),
    }
}

impl Storage for SqliteStorage {
    // ===== Transactions =====

    fn begin(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    // ===== Product Management =====

    fn get_product(&self, id: i64) -> StorageResult<Option<ProductRecord>> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                params![id],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    fn get_product_by_name(&self, name: &str) -> StorageResult<Option<ProductRecord>> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {} FROM products WHERE name = ?1", PRODUCT_COLUMNS),
                params![name],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    fn insert_product(&mut self, name: &str, price: &str) -> StorageResult<i64> {
        self.conn
            .execute(
                "INSERT INTO products (name, price) VALUES (?1, ?2)",
                params![name, price],
            )
            .map_err(|e| map_write_error(e, name))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_price(&mut self, id: i64, price: &str) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE products SET price = ?1 WHERE id = ?2",
            params![price, id],
        )?;
        if changed == 0 {
            return Err(StorageError::Database(format!("no product with id {}", id)));
        }
        Ok(())
    }

    fn update_product(&mut self, id: i64, name: &str, price: &str) -> StorageResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE products SET name = ?1, price = ?2 WHERE id = ?3",
                params![name, price, id],
            )
            .map_err(|e| map_write_error(e, name))?;
        if changed == 0 {
            return Err(StorageError::Database(format!("no product with id {}", id)));
        }
        Ok(())
    }

    fn delete_product(&mut self, id: i64) -> StorageResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn list_products(&self) -> StorageResult<Vec<ProductRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))?;

        let products = stmt
            .query_map([], product_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    fn count_products(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Ledger =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, pages_fetched = ?3,
             records_extracted = ?4, inserted = ?5, updated = ?6, unchanged = ?7,
             stop_reason = ?8 WHERE id = ?9",
            params![
                status.to_db_string(),
                now,
                totals.pages_fetched as i64,
                totals.records_extracted as i64,
                totals.inserted as i64,
                totals.updated as i64,
                totals.unchanged as i64,
                totals.stop_reason,
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM crawl_runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM crawl_runs ORDER BY id DESC LIMIT 1",
                    RUN_COLUMNS
                ),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn count_runs_by_status(&self, status: RunStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawl_runs WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn sum_run_totals(&self) -> StorageResult<RunTotals> {
        let totals = self.conn.query_row(
            "SELECT COALESCE(SUM(pages_fetched), 0), COALESCE(SUM(records_extracted), 0),
             COALESCE(SUM(inserted), 0), COALESCE(SUM(updated), 0), COALESCE(SUM(unchanged), 0)
             FROM crawl_runs WHERE finished_at IS NOT NULL",
            [],
            |row| {
                Ok(RunTotals {
                    pages_fetched: row.get::<_, i64>(0)? as u64,
                    records_extracted: row.get::<_, i64>(1)? as u64,
                    inserted: row.get::<_, i64>(2)? as u64,
                    updated: row.get::<_, i64>(3)? as u64,
                    unchanged: row.get::<_, i64>(4)? as u64,
                    stop_reason: None,
                })
            },
        )?;
        Ok(totals)
    }
}

/// Initializes or opens a database at the given path
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(Connection)` - Successfully opened/created database
/// * `Err(rusqlite::Error)` - Failed to open database
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
