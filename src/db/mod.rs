//! Database operations for users, journals, catalogs and streak activity.
//!
//! This module provides SQLite storage through `rusqlite`, with connection
//! pooling via r2d2. Per-table query functions take a plain `&Connection`, so
//! they compose inside a [`Database::transaction`] call: a `Transaction`
//! derefs to `Connection`.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions, schema initialization and catalog seeding
//! - `users`: Accounts and streak counters
//! - `journals`: Journal rows and the filtered listing query
//! - `tags`: Tag catalog and journal/tag associations
//! - `moods`: Mood catalog
//! - `streaks`: Daily activity records
//!
//! # Example
//!
//! ```no_run
//! use entryit::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/entryit.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), entryit::AppError>(())
//! ```

pub mod journals;
pub mod moods;
pub mod schema;
pub mod streaks;
pub mod tags;
pub mod users;

use crate::constants::{DB_BUSY_TIMEOUT_MS, DB_POOL_MAX_SIZE};
use crate::errors::{AppResult, DatabaseError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling.
///
/// Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates an SQLite database file.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - Database file cannot be opened
    /// - Connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(DB_POOL_MAX_SIZE)
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        // Test the connection
        let conn = pool.get().map_err(DatabaseError::Pool)?;
        conn.execute_batch("SELECT 1")
            .map_err(DatabaseError::Sqlite)?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema and seeds the catalogs.
    ///
    /// This is idempotent and safe to call multiple times.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        schema::seed_catalogs(&conn, chrono::Utc::now())?;
        info!("Database schema initialized");
        Ok(())
    }

    /// Runs `f` inside a single immediate transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; any error rolls back
    /// every write made through it.
    pub fn transaction<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DatabaseError::Sqlite)?;

        let value = f(&tx)?;

        tx.commit().map_err(DatabaseError::Sqlite)?;
        Ok(value)
    }
}

/// SQL name of the Unicode-aware lowercase function. SQLite's own `LOWER()`
/// only folds ASCII letters.
pub(crate) const UNICODE_LOWER_FN: &str = "unicode_lower";

/// Connection customizer applied to every pooled connection.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_millis(DB_BUSY_TIMEOUT_MS))?;
        conn.create_scalar_function(
            UNICODE_LOWER_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let value: Option<String> = ctx.get(0)?;
                Ok(value.map(|s| s.to_lowercase()))
            },
        )?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}

/// Reads a TEXT column holding a UUID.
pub(crate) fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a nullable TEXT column holding a UUID.
pub(crate) fn opt_uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Uuid::parse_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// `?, ?, ?` with `n` placeholders, for `IN (...)` clauses.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;
    use tempfile::TempDir;

    /// Opens a fresh, initialized database in a temporary directory.
    ///
    /// The `TempDir` must outlive the database.
    pub(crate) fn test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(&temp_dir.path().join("test.db")).unwrap();
        db.initialize_schema().unwrap();
        (temp_dir, db)
    }
}
