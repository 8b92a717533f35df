//! DuckDB storage for the timeseries table.
//!
//! [`Store`] owns the database handle. Requests never share a connection:
//! each one calls [`ConnectionProvider::acquire`] and gets its own handle to
//! the same database, which is closed when dropped.

use std::path::Path;
use std::sync::Mutex;

use duckdb::Connection as DuckDbConnection;

use crate::config::TIMESERIES_TABLE;
use crate::error::{CoviscopeError, Result};

/// Source of per-request database connections.
pub trait ConnectionProvider: Send + Sync {
    /// Open a connection for one request, verified with a round-trip.
    ///
    /// Fails with [`CoviscopeError::Connectivity`] if the database cannot be
    /// reached.
    fn acquire(&self) -> Result<DuckDbConnection>;
}

/// Owns the DuckDB database holding the `covid19` table.
pub struct Store {
    root: Mutex<DuckDbConnection>,
}

impl Store {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = DuckDbConnection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "opened database");
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(DuckDbConnection::open_in_memory()?))
    }

    fn from_connection(conn: DuckDbConnection) -> Self {
        Self {
            root: Mutex::new(conn),
        }
    }

    /// Create the timeseries table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<()> {
        self.with_root(|conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                   date DATE NOT NULL, \
                   location_key VARCHAR NOT NULL, \
                   new_confirmed BIGINT, \
                   new_deceased BIGINT, \
                   cumulative_confirmed BIGINT\
                 )",
                TIMESERIES_TABLE
            ))?;
            Ok(())
        })
    }

    /// Number of rows in the timeseries table.
    pub fn row_count(&self) -> Result<i64> {
        self.with_root(|conn| {
            let count = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", TIMESERIES_TABLE),
                [],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Replace the timeseries table with the contents of a CSV file.
    ///
    /// Expects the COVID-19 Open Data `epidemiology.csv` layout; columns
    /// beyond the ones charted are ignored.
    pub fn load_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let reader = format!(
            "read_csv_auto('{}', header = true)",
            sql_path(path.as_ref())
        );
        self.import(&reader)
    }

    /// Replace the timeseries table with the contents of a newline-delimited
    /// JSON file.
    pub fn load_ndjson<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let reader = format!(
            "read_json_auto('{}', format = 'newline_delimited')",
            sql_path(path.as_ref())
        );
        self.import(&reader)
    }

    /// Rows without a date or location key are dropped.
    fn import(&self, reader: &str) -> Result<usize> {
        let loaded = self.with_root(|conn| {
            conn.execute_batch(&format!(
                "CREATE OR REPLACE TABLE {table} AS \
                 SELECT CAST(date AS DATE) AS date, \
                        CAST(location_key AS VARCHAR) AS location_key, \
                        CAST(new_confirmed AS BIGINT) AS new_confirmed, \
                        CAST(new_deceased AS BIGINT) AS new_deceased, \
                        CAST(cumulative_confirmed AS BIGINT) AS cumulative_confirmed \
                 FROM {reader} \
                 WHERE date IS NOT NULL AND location_key IS NOT NULL",
                table = TIMESERIES_TABLE,
                reader = reader
            ))?;
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", TIMESERIES_TABLE),
                [],
                |row| row.get(0),
            )?;
            Ok(count)
        })?;
        tracing::info!(rows = loaded, table = TIMESERIES_TABLE, "imported timeseries");
        Ok(loaded as usize)
    }

    fn with_root<T>(&self, f: impl FnOnce(&DuckDbConnection) -> Result<T>) -> Result<T> {
        let conn = self
            .root
            .lock()
            .map_err(|_| CoviscopeError::Connectivity("database handle lock poisoned".into()))?;
        f(&conn)
    }
}

impl ConnectionProvider for Store {
    fn acquire(&self) -> Result<DuckDbConnection> {
        let conn = {
            let root = self.root.lock().map_err(|_| {
                CoviscopeError::Connectivity("database handle lock poisoned".into())
            })?;
            root.try_clone()
                .map_err(|e| CoviscopeError::Connectivity(e.to_string()))?
        };
        ping(&conn)?;
        Ok(conn)
    }
}

/// Round-trip a trivial statement to prove the connection is usable.
pub fn ping(conn: &DuckDbConnection) -> Result<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
        .map(|_| ())
        .map_err(|e| CoviscopeError::Connectivity(format!("ping error: {e}")))
}

/// Forward slashes for DuckDB, quotes doubled for the string literal.
fn sql_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace('\'', "''")
}
