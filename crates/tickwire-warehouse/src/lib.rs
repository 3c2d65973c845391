//! # tickwire warehouse
//!
//! DuckDB-backed persistence for price quotes with insert-or-update
//! semantics keyed by ticker.
//!
//! The store is a stateless request/response facade over a small connection
//! pool: every call acquires its own connection, executes a parameterized
//! statement, and validates the affected-row count against the contract.
//! All failures surface as the unified [`DaoError`] taxonomy; callers never
//! see a driver-native error type.

pub mod migrations;
pub mod pool;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use duckdb::ToSql;
use tracing::error;

use tickwire_core::{DaoError, Quote, Ticker};

pub use pool::{ConnectionManager, PooledConnection};

/// Configuration for the quote database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Path to the DuckDB database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections in the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        let db_path = resolve_tickwire_home().join("quotes.duckdb");
        Self {
            db_path,
            max_pool_size: 4,
        }
    }
}

/// Relational DAO for price quotes.
///
/// `save` is an upsert: an existence check by ticker decides between an
/// insert of the full row and an update of the five numeric fields, and
/// either statement must affect exactly one row. The check-then-write
/// sequence is not atomic; a concurrent insert of the same new ticker loses
/// with [`DaoError::InsertFailed`].
#[derive(Clone)]
pub struct QuoteStore {
    manager: ConnectionManager,
}

impl QuoteStore {
    /// Open a quote store with default configuration.
    pub fn open_default() -> Result<Self, DaoError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a quote store with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, DaoError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| DaoError::transport(format!("failed to create db dir: {error}")))?;
        }

        let manager =
            ConnectionManager::new(config.db_path, config.max_pool_size).map_err(db_transport)?;
        let store = Self { manager };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), DaoError> {
        let connection = self.acquire()?;
        migrations::apply_migrations(&connection).map_err(db_transport)
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Insert-or-update a quote keyed by its ticker.
    ///
    /// Returns the entity unchanged: the backend has no server-generated
    /// fields for quotes.
    pub fn save(&self, quote: &Quote) -> Result<Quote, DaoError> {
        if self.exists_by_id(&quote.ticker)? {
            self.update_one(quote)?;
        } else {
            self.insert_one(quote)?;
        }
        Ok(quote.clone())
    }

    /// True iff a row with the given ticker is present.
    pub fn exists_by_id(&self, ticker: &Ticker) -> Result<bool, DaoError> {
        let connection = self.acquire()?;
        let key = ticker.as_str();
        let params: [&dyn ToSql; 1] = [&key];
        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM quotes WHERE ticker = ?",
                params.as_slice(),
                |row| row.get(0),
            )
            .map_err(db_transport)?;
        Ok(count > 0)
    }

    /// Look up a quote by ticker.
    pub fn find_by_id(&self, ticker: &Ticker) -> Result<Option<Quote>, DaoError> {
        let connection = self.acquire()?;
        let key = ticker.as_str();
        let params: [&dyn ToSql; 1] = [&key];
        let result = connection.query_row(
            "SELECT ticker, last_price, bid_price, bid_size, ask_price, ask_size \
             FROM quotes WHERE ticker = ?",
            params.as_slice(),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            },
        );

        match result {
            Ok((ticker, last_price, bid_price, bid_size, ask_price, ask_size)) => {
                let ticker = Ticker::parse(&ticker)
                    .map_err(|error| DaoError::codec(format!("stored ticker invalid: {error}")))?;
                Ok(Some(Quote {
                    ticker,
                    last_price,
                    bid_price,
                    bid_size,
                    ask_price,
                    ask_size,
                }))
            }
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(db_transport(error)),
        }
    }

    /// Remove the row for a ticker, if any.
    pub fn delete_by_id(&self, ticker: &Ticker) -> Result<(), DaoError> {
        let connection = self.acquire()?;
        let key = ticker.as_str();
        let params: [&dyn ToSql; 1] = [&key];
        connection
            .execute("DELETE FROM quotes WHERE ticker = ?", params.as_slice())
            .map_err(db_transport)?;
        Ok(())
    }

    /// Deliberate scope limit of this layer.
    pub fn save_all(&self, _quotes: &[Quote]) -> Result<Vec<Quote>, DaoError> {
        Err(DaoError::Unsupported {
            operation: "save_all",
        })
    }

    /// Deliberate scope limit of this layer.
    pub fn find_all(&self) -> Result<Vec<Quote>, DaoError> {
        Err(DaoError::Unsupported {
            operation: "find_all",
        })
    }

    /// Deliberate scope limit of this layer.
    pub fn find_all_by_id(&self, _tickers: &[Ticker]) -> Result<Vec<Quote>, DaoError> {
        Err(DaoError::Unsupported {
            operation: "find_all_by_id",
        })
    }

    /// Deliberate scope limit of this layer.
    pub fn delete_all(&self) -> Result<(), DaoError> {
        Err(DaoError::Unsupported {
            operation: "delete_all",
        })
    }

    fn insert_one(&self, quote: &Quote) -> Result<(), DaoError> {
        let connection = self.acquire()?;
        let key = quote.ticker.as_str();
        let params: [&dyn ToSql; 6] = [
            &key,
            &quote.last_price,
            &quote.bid_price,
            &quote.bid_size,
            &quote.ask_price,
            &quote.ask_size,
        ];
        let result = connection.execute(
            "INSERT INTO quotes (ticker, last_price, bid_price, bid_size, ask_price, ask_size) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params.as_slice(),
        );

        let rows = match result {
            Ok(rows) => rows,
            Err(error) if is_duplicate_key(&error) => {
                // Duplicate key: a concurrent writer won the insert.
                error!("insert for {} hit a constraint: {}", quote.ticker, error);
                return Err(DaoError::InsertFailed {
                    ticker: quote.ticker.to_string(),
                    rows: 0,
                });
            }
            Err(error) => return Err(db_transport(error)),
        };

        if rows != 1 {
            error!("insert for {} affected {} rows", quote.ticker, rows);
            return Err(DaoError::InsertFailed {
                ticker: quote.ticker.to_string(),
                rows,
            });
        }

        Ok(())
    }

    fn update_one(&self, quote: &Quote) -> Result<(), DaoError> {
        let connection = self.acquire()?;
        let key = quote.ticker.as_str();
        let params: [&dyn ToSql; 6] = [
            &quote.last_price,
            &quote.bid_price,
            &quote.bid_size,
            &quote.ask_price,
            &quote.ask_size,
            &key,
        ];
        let rows = connection
            .execute(
                "UPDATE quotes SET last_price = ?, bid_price = ?, bid_size = ?, \
                 ask_price = ?, ask_size = ?, updated_at = CURRENT_TIMESTAMP \
                 WHERE ticker = ?",
                params.as_slice(),
            )
            .map_err(db_transport)?;

        if rows != 1 {
            error!("update for {} affected {} rows", quote.ticker, rows);
            return Err(DaoError::UpdateConflict {
                ticker: quote.ticker.to_string(),
                rows,
            });
        }

        Ok(())
    }

    fn acquire(&self) -> Result<PooledConnection, DaoError> {
        self.manager.acquire().map_err(db_transport)
    }
}

fn db_transport(error: duckdb::Error) -> DaoError {
    DaoError::transport(error.to_string())
}

// DuckDB reports a losing concurrent insert either as a primary-key
// constraint violation or as a write-write transaction conflict, depending
// on commit timing. Inside the insert path both mean the same thing.
fn is_duplicate_key(error: &duckdb::Error) -> bool {
    let message = error.to_string().to_ascii_lowercase();
    message.contains("constraint") || message.contains("conflict")
}

/// Resolve the tickwire home directory from environment or default.
fn resolve_tickwire_home() -> PathBuf {
    if let Some(path) = env::var_os("TICKWIRE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tickwire");
    }

    PathBuf::from(".tickwire")
}
