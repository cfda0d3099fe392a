//! Pooled `DuckDB` connections for the record store.
//!
//! All handed-out connections are clones of one root connection, so they share
//! a single database instance and see each other's committed writes.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use ::duckdb::Connection;

struct PoolInner {
    db_path: PathBuf,
    max_idle: usize,
    root: Mutex<Option<Connection>>,
    idle: Mutex<Vec<Connection>>,
}

/// Small connection pool over a single database file.
///
/// The root connection is opened lazily on first use. Released connections go
/// back to the idle list, up to `max_idle`.
#[derive(Clone)]
pub struct DuckDbPool {
    inner: Arc<PoolInner>,
}

impl DuckDbPool {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_idle: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                db_path: path.into(),
                max_idle: max_idle.max(1),
                root: Mutex::new(None),
                idle: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Take an idle connection, or clone a new one from the root.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or configured.
    pub fn acquire(&self) -> Result<PooledConnection, ::duckdb::Error> {
        let idle = self
            .inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        let connection = match idle {
            Some(connection) => connection,
            None => self.clone_root()?,
        };

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }

    fn clone_root(&self) -> Result<Connection, ::duckdb::Error> {
        let mut root = self
            .inner
            .root
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(connection) = root.as_ref() {
            return connection.try_clone();
        }

        let connection = open_connection(self.inner.db_path.as_path())?;
        let clone = connection.try_clone()?;
        *root = Some(connection);
        Ok(clone)
    }
}

/// A connection that goes back to its pool when dropped.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        match self.connection.as_ref() {
            Some(connection) => connection,
            // `connection` is only taken in `drop`.
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut idle = self.pool.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.pool.max_idle {
            idle.push(connection);
        }
    }
}

fn open_connection(path: &Path) -> Result<Connection, ::duckdb::Error> {
    let connection = Connection::open(path)?;
    connection.execute_batch("PRAGMA disable_progress_bar;")?;
    Ok(connection)
}
