//! DuckDB connection pool management.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use duckdb::Connection;

struct PoolState {
    // Anchor connection: keeps the database instance alive and is the
    // source of clones. DuckDB allows one database handle per file per
    // process, so new connections must come from `try_clone`, never from
    // a second `open` of the same path.
    base: Connection,
    idle: Vec<Connection>,
}

struct PoolInner {
    db_path: PathBuf,
    max_pool_size: usize,
    state: Mutex<PoolState>,
}

/// A connection pool manager for DuckDB connections.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<PoolInner>,
}

impl ConnectionManager {
    /// Open the database and create a pool manager for it.
    ///
    /// # Arguments
    /// * `path` - Path to the DuckDB database file
    /// * `max_pool_size` - Maximum number of connections to keep idle
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened.
    pub fn new(path: impl Into<PathBuf>, max_pool_size: usize) -> Result<Self, duckdb::Error> {
        let db_path = path.into();
        let base = Connection::open(db_path.as_path())?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_pool_size: max_pool_size.max(1),
                state: Mutex::new(PoolState {
                    base,
                    idle: Vec::new(),
                }),
            }),
        })
    }

    /// Acquire a connection from the pool, cloning one if none is idle.
    ///
    /// # Errors
    /// Returns an error if a new connection cannot be cloned from the
    /// anchor connection.
    ///
    /// # Panics
    /// Panics if the pool mutex is poisoned (a previous panic while holding
    /// the lock).
    pub fn acquire(&self) -> Result<PooledConnection, duckdb::Error> {
        let mut state = self
            .inner
            .state
            .lock()
            .expect("duckdb connection pool mutex poisoned");
        let connection = match state.idle.pop() {
            Some(connection) => connection,
            None => state.base.try_clone()?,
        };
        drop(state);

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }
}

/// A pooled connection that returns to the pool when dropped.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection unexpectedly missing")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection unexpectedly missing")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut state = self
            .pool
            .state
            .lock()
            .expect("duckdb connection pool mutex poisoned");
        if state.idle.len() < self.pool.max_pool_size {
            state.idle.push(connection);
        }
    }
}
