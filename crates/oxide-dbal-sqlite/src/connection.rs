//! A blocking SQLite connection.

use std::any::Any;
use std::path::Path;

use oxide_dbal_core::command::Command;
use oxide_dbal_core::config::DataSource;
use oxide_dbal_core::connection::{BufferedResult, Connection, NativeResult};
use oxide_dbal_core::dialect::Dialect;
use oxide_dbal_core::{DbalError, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::row::{bind_params, record_from_row};

/// The native sqlx connection handle.
pub type NativeConnection = sqlx::SqliteConnection;

const MEMORY: &str = ":memory:";

/// A SQLite connection driven from a private current-thread runtime.
///
/// Every call blocks the calling thread until the driver is done, so the
/// connection must not be used from inside another tokio runtime.
pub struct SqliteConnection {
    data_source: DataSource,
    runtime: Runtime,
    native: NativeConnection,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("data_source", &self.data_source.id)
            .finish_non_exhaustive()
    }
}

impl SqliteConnection {
    /// Opens the database a data source describes.
    ///
    /// The file path is taken from `database`, then `host`; without either
    /// the database lives in memory. Missing files are created.
    ///
    /// # Errors
    ///
    /// Returns `Config` when the data source is not a SQLite one and
    /// `Connection` when the file cannot be opened.
    pub fn open(data_source: DataSource) -> Result<Self> {
        if data_source.dialect != Dialect::Sqlite {
            return Err(DbalError::Config(format!(
                "data source '{}' uses dialect {}, not {}",
                data_source.id,
                data_source.dialect,
                Dialect::Sqlite
            )));
        }

        let path = data_source
            .database
            .clone()
            .or_else(|| data_source.host.clone())
            .unwrap_or_else(|| String::from(MEMORY));
        let options = if path == MEMORY {
            "sqlite::memory:"
                .parse::<SqliteConnectOptions>()
                .map_err(|e| DbalError::connection(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true)
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbalError::connection(e.to_string()))?;
        let native = runtime
            .block_on(options.connect())
            .map_err(|e| DbalError::connection(e.to_string()))?;

        info!(data_source = %data_source.id, path = %path, "Opened SQLite connection");
        Ok(Self {
            data_source,
            runtime,
            native,
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the runtime or database cannot be created.
    pub fn memory() -> Result<Self> {
        Self::open(DataSource::new("memory", Dialect::Sqlite))
    }

    /// Opens (or creates) a database file.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the file cannot be opened.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_string_lossy().into_owned();
        Self::open(DataSource::new("file", Dialect::Sqlite).database(path))
    }

    /// Returns the runtime and the native handle for direct driver calls.
    #[must_use]
    pub fn resource(&mut self) -> (&Runtime, &mut NativeConnection) {
        (&self.runtime, &mut self.native)
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the driver fails to shut down cleanly.
    pub fn close(self) -> Result<()> {
        use sqlx::Connection as _;

        let Self {
            data_source,
            runtime,
            native,
        } = self;
        runtime
            .block_on(native.close())
            .map_err(|e| DbalError::connection(e.to_string()))?;
        info!(data_source = %data_source.id, "Closed SQLite connection");
        Ok(())
    }

    fn run(&mut self, sql: &str) -> Result<u64> {
        let result = self
            .runtime
            .block_on(sqlx::query(sql).execute(&mut self.native))
            .map_err(|e| DbalError::query(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

impl Connection for SqliteConnection {
    fn data_source(&self) -> &DataSource {
        &self.data_source
    }

    /// Returns the [`NativeConnection`]. Driving it needs a tokio runtime;
    /// [`SqliteConnection::resource`] hands out the connection's own.
    fn get_resource(&mut self) -> &mut dyn Any {
        &mut self.native
    }

    fn execute(&mut self, command: Command) -> Result<u64> {
        let (sql, params) = command.into_parts();
        debug!(sql = %sql, params = params.len(), "Executing command");
        let query = bind_params(sqlx::query(&sql), params);
        let result = self
            .runtime
            .block_on(query.execute(&mut self.native))
            .map_err(|e| DbalError::query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    fn query(&mut self, command: Command) -> Result<Box<dyn NativeResult>> {
        let (sql, params) = command.into_parts();
        debug!(sql = %sql, params = params.len(), "Running query");
        let query = bind_params(sqlx::query(&sql), params);
        let rows = self
            .runtime
            .block_on(query.fetch_all(&mut self.native))
            .map_err(|e| DbalError::query(e.to_string()))?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(BufferedResult::new(records)))
    }

    fn begin_transaction(&mut self) -> Result<()> {
        debug!("BEGIN");
        self.run("BEGIN").map(|_| ())
    }

    fn commit(&mut self) -> Result<()> {
        debug!("COMMIT");
        self.run("COMMIT").map(|_| ())
    }

    fn rollback(&mut self) -> Result<()> {
        debug!("ROLLBACK");
        self.run("ROLLBACK").map(|_| ())
    }
}
