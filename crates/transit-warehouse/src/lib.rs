//! # Transit Warehouse
//!
//! Embedded `DuckDB` store for transit-ingest run records.
//!
//! The store is append-only: every pipeline write becomes a new row in
//! `transit_records`, keyed by a freshly generated identifier, with a matching
//! audit row in `ingest_log`. Nothing here reads records back for the
//! pipeline; [`Warehouse::record_count`] exists for operational checks.
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `transit_records` | One row per stored run or per stored source summary |
//! | `ingest_log` | Write audit trail |
//! | `schema_migrations` | Applied migration versions |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transit_warehouse::{StoredRecord, Warehouse};
//!
//! let warehouse = Warehouse::open_default()?;
//! warehouse.put_record(&StoredRecord {
//!     id: "8d3c2f8e-3a44-4bb4-9c1f-0b2b7f4f7a10".to_string(),
//!     timestamp: "2026-01-01T00:00:00Z".to_string(),
//!     source: None,
//!     data: "{}".to_string(),
//!     status: "processed".to_string(),
//! })?;
//! # Ok::<(), transit_warehouse::WarehouseError>(())
//! ```

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::Connection;
use ::duckdb::ToSql;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use duckdb::{DuckDbPool, PooledConnection};

/// Status written on every record produced by the pipeline.
pub const PROCESSED_STATUS: &str = "processed";

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error while preparing the database location.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Record rejected before reaching the database.
    #[error("record rejected: {0}")]
    Rejected(String),
}

/// Location and pooling settings for the warehouse.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for transit-ingest data.
    pub transit_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept around.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::at_home(resolve_transit_home())
    }
}

impl WarehouseConfig {
    /// Configuration rooted at `transit_home`, with the database at
    /// `<transit_home>/warehouse.duckdb`.
    pub fn at_home(transit_home: impl Into<PathBuf>) -> Self {
        let transit_home = transit_home.into();
        let db_path = transit_home.join("warehouse.duckdb");
        Self {
            transit_home,
            db_path,
            max_pool_size: 2,
        }
    }
}

/// One append-only row of `transit_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    /// ISO-8601 instant copied from the run envelope.
    pub timestamp: String,
    /// Source name, present only for per-source writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Serialized summary payload.
    pub data: String,
    pub status: String,
}

/// The warehouse handle. Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct Warehouse {
    config: WarehouseConfig,
    pool: DuckDbPool,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open (creating if needed) the database and apply migrations.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let pool = DuckDbPool::new(config.db_path.clone(), config.max_pool_size);
        let warehouse = Self { config, pool };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.pool.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.pool.db_path()
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Append one record and its audit row in a single transaction.
    ///
    /// A duplicate `id` fails the whole write; existing rows are never
    /// replaced.
    pub fn put_record(&self, record: &StoredRecord) -> Result<(), WarehouseError> {
        if record.id.trim().is_empty() {
            return Err(WarehouseError::Rejected(String::from(
                "record id must not be empty",
            )));
        }

        let connection = self.pool.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            let params: [&dyn ToSql; 5] = [
                &record.id,
                &record.timestamp,
                &record.source,
                &record.data,
                &record.status,
            ];
            connection.execute(
                "INSERT INTO transit_records (id, timestamp, source, data, status, written_at) \
                 VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
                params.as_slice(),
            )?;

            let params: [&dyn ToSql; 3] = [&record.id, &record.source, &record.status];
            connection.execute(
                "INSERT INTO ingest_log (record_id, source, status, timestamp) \
                 VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
                params.as_slice(),
            )?;

            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    /// Number of rows in `transit_records`.
    pub fn record_count(&self) -> Result<u64, WarehouseError> {
        let connection = self.pool.acquire()?;
        let count: i64 =
            connection.query_row("SELECT COUNT(*) FROM transit_records", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

/// `$TRANSIT_HOME`, else `$HOME/.transit-ingest`, else `./.transit-ingest`.
fn resolve_transit_home() -> PathBuf {
    if let Some(path) = env::var_os("TRANSIT_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".transit-ingest");
    }

    PathBuf::from(".transit-ingest")
}
