//! SQL dialect support.
//!
//! Different databases have different quoting, pagination, DML and locking
//! idioms. Each dialect is a unit struct implementing the precompiler, the four
//! statement renderers and the lock strategy; [`Dialect::sql`] maps the dialect
//! key to its implementation.

mod db2;
mod firebird;
mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod standard;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use db2::Db2Dialect;
pub use firebird::FirebirdDialect;
pub use mssql::MsSqlDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use standard::StandardDialect;

use crate::error::DbalError;
use crate::lock::LockStrategy;
use crate::statement::{DeleteRenderer, InsertRenderer, SelectRenderer, UpdateRenderer};

/// Everything a statement needs to render for one dialect.
pub trait SqlDialect:
    SelectRenderer + InsertRenderer + UpdateRenderer + DeleteRenderer + LockStrategy + fmt::Debug
{
    /// Returns the dialect key this implementation renders for.
    fn dialect(&self) -> Dialect;
}

/// Target SQL engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    /// ANSI SQL.
    #[default]
    Standard,
    /// IBM DB2.
    Db2,
    /// Firebird.
    Firebird,
    /// MariaDB.
    MariaDb,
    /// Microsoft SQL Server.
    MsSql,
    /// MySQL.
    MySql,
    /// Oracle.
    Oracle,
    /// PostgreSQL.
    PostgreSql,
    /// SQLite.
    Sqlite,
}

static MYSQL: MySqlDialect = MySqlDialect::new(Dialect::MySql);
static MARIADB: MySqlDialect = MySqlDialect::new(Dialect::MariaDb);

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Self; 9] = [
        Self::Standard,
        Self::Db2,
        Self::Firebird,
        Self::MariaDb,
        Self::MsSql,
        Self::MySql,
        Self::Oracle,
        Self::PostgreSql,
        Self::Sqlite,
    ];

    /// Returns the dialect key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Db2 => "DB2",
            Self::Firebird => "Firebird",
            Self::MariaDb => "MariaDB",
            Self::MsSql => "MsSQL",
            Self::MySql => "MySQL",
            Self::Oracle => "Oracle",
            Self::PostgreSql => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }

    /// Returns the rendering implementation for this dialect.
    #[must_use]
    pub fn sql(self) -> &'static dyn SqlDialect {
        match self {
            Self::Standard => &StandardDialect,
            Self::Db2 => &Db2Dialect,
            Self::Firebird => &FirebirdDialect,
            Self::MariaDb => &MARIADB,
            Self::MsSql => &MsSqlDialect,
            Self::MySql => &MYSQL,
            Self::Oracle => &OracleDialect,
            Self::PostgreSql => &PostgresDialect,
            Self::Sqlite => &SqliteDialect,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DbalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "ansi" | "sql" => Ok(Self::Standard),
            "db2" | "ibm_db2" => Ok(Self::Db2),
            "firebird" | "interbase" => Ok(Self::Firebird),
            "mariadb" => Ok(Self::MariaDb),
            "mssql" | "sqlserver" | "sqlsrv" => Ok(Self::MsSql),
            "mysql" => Ok(Self::MySql),
            "oracle" | "oci" => Ok(Self::Oracle),
            "postgresql" | "postgres" | "pgsql" => Ok(Self::PostgreSql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(DbalError::InvalidArgument(format!(
                "unknown dialect '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = DbalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        Self::from(dialect.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trips_every_dialect() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.sql().dialect(), dialect);
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive_with_aliases() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("MSSQL".parse::<Dialect>().unwrap(), Dialect::MsSql);
        assert_eq!(" sqlite3 ".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert!(matches!(
            "informix".parse::<Dialect>(),
            Err(DbalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serde_uses_dialect_key() {
        let json = serde_json::to_string(&Dialect::MsSql).unwrap();
        assert_eq!(json, "\"MsSQL\"");
        let parsed: Dialect = serde_json::from_str("\"oracle\"").unwrap();
        assert_eq!(parsed, Dialect::Oracle);
        assert!(serde_json::from_str::<Dialect>("\"nope\"").is_err());
    }
}
