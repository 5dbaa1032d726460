//! # oxide-dbal-core
//!
//! A database abstraction layer: one fluent API for SELECT, INSERT, UPDATE,
//! DELETE and table locks, rendered into dialect-correct SQL for standard SQL,
//! PostgreSQL, MySQL/MariaDB, SQLite, MS SQL Server, Oracle, DB2 and Firebird.
//!
//! This crate provides:
//! - A statement IR per statement kind, filled by fluent builders
//! - Per-dialect precompilers quoting identifiers and rendering literals
//! - Per-dialect renderers applying structural rewrites (bounded DML through
//!   `ctid`, CTEs, `ROWNUM` windows, `rowid`, fullselects)
//! - A connection contract and a pull-based data reader over native results
//! - A lock builder acquiring table locks inside one transaction
//!
//! ## Building statements
//!
//! ```rust
//! use oxide_dbal_core::dialect::Dialect;
//! use oxide_dbal_core::statement::{Filter, Operator, Update};
//!
//! let sql = Update::new(Dialect::MsSql)
//!     .table("t0")
//!     .set("status", "done")
//!     .where_clause("status", Operator::Eq, "pending")
//!     .limit(5)
//!     .statement(true)
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "WITH t1 AS (SELECT TOP 5 * FROM [t0] WHERE [status] = 'pending') UPDATE t1 SET [status] = 'done';"
//! );
//! ```
//!
//! ## Reading rows
//!
//! ```rust
//! use oxide_dbal_core::dialect::Dialect;
//! use oxide_dbal_core::mock::MockConnection;
//! use oxide_dbal_core::reader::Record;
//! use oxide_dbal_core::statement::Select;
//! use oxide_dbal_core::value::SqlValue;
//!
//! let mut row = Record::new();
//! row.push("name", SqlValue::Text("Alice".into()));
//! let mut conn = MockConnection::new(Dialect::PostgreSql)
//!     .with_result("SELECT \"name\" FROM \"users\"", vec![row]);
//!
//! let mut reader = Select::new(Dialect::PostgreSql)
//!     .column("name")
//!     .from("users")
//!     .query(&mut conn)
//!     .unwrap();
//! while reader.read().unwrap() {
//!     let name: String = reader.record().unwrap().get_as("name").unwrap();
//!     assert_eq!(name, "Alice");
//! }
//! reader.dispose();
//! ```

pub mod command;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod lock;
pub mod mock;
pub mod precompiler;
pub mod reader;
pub mod statement;
pub mod value;

pub use command::Command;
pub use config::{Config, DataSource};
pub use connection::{BufferedResult, Connection, NativeResult};
pub use dialect::{Dialect, SqlDialect};
pub use error::{DbalError, Result};
pub use lock::LockBuilder;
pub use reader::{DataReader, FromRecord, Record, ResultSet};
pub use statement::{Delete, Filter, Insert, Select, Update};
pub use value::{FromSqlValue, SqlValue, ToSqlValue};
