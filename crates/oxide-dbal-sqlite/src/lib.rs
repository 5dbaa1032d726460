//! # oxide-dbal-sqlite
//!
//! A SQLite [`Connection`](oxide_dbal_core::Connection) for `oxide-dbal-core`,
//! backed by `sqlx`.
//!
//! The core's contract is synchronous, so each connection owns a
//! current-thread tokio runtime and blocks on every driver call. Query results
//! are fetched in full and handed to the data reader as a buffered native
//! result.
//!
//! # How SQLite differs from other dialects
//!
//! - **Bounded DML**: `DELETE`/`UPDATE` with `ORDER BY`/`LIMIT` are rendered
//!   through `rowid IN (SELECT rowid ...)`, which works without the
//!   `SQLITE_ENABLE_UPDATE_DELETE_LIMIT` compile option.
//! - **[Type affinity]**: values are converted by their storage class, not by
//!   the declared column type.
//! - **Locks**: SQLite has no table-lock statement; the lock builder rejects
//!   the dialect.
//!
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_dbal_core::{Command, Connection, Dialect, Filter, Insert, Select};
//! use oxide_dbal_core::statement::Operator;
//! use oxide_dbal_sqlite::SqliteConnection;
//!
//! let mut conn = SqliteConnection::memory().unwrap();
//! conn.execute(Command::new("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)"))
//!     .unwrap();
//!
//! Insert::new(Dialect::Sqlite)
//!     .into_table("users")
//!     .value("name", "Alice")
//!     .execute(&mut conn)
//!     .unwrap();
//!
//! let mut reader = Select::new(Dialect::Sqlite)
//!     .column("name")
//!     .from("users")
//!     .where_clause("id", Operator::Eq, 1)
//!     .query(&mut conn)
//!     .unwrap();
//! assert!(reader.read().unwrap());
//! assert_eq!(reader.record().unwrap().get_as::<String>("name").unwrap(), "Alice");
//! ```

mod connection;
mod row;

pub use connection::{NativeConnection, SqliteConnection};
