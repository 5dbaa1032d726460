//! Table locks.
//!
//! A [`LockBuilder`] collects one lock per table and acquires them, in
//! registration order, inside a single transaction. Each dialect describes the
//! hints it accepts and how a lock statement is spelled through
//! [`LockStrategy`].

use regex::Regex;
use tracing::{debug, info};

use crate::command::Command;
use crate::connection::Connection;
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{DbalError, Result};
use crate::precompiler::Precompiler;

/// The lock hints a dialect accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSyntax {
    /// Pattern a lock mode hint must match in full (case-insensitive).
    pub modes: &'static str,
    /// Pattern for the wait modifier, if the dialect has one.
    pub wait: Option<&'static str>,
    /// Modes used when no recognized mode hint is given.
    pub default_modes: &'static [&'static str],
    /// Whether more than one mode hint may be combined.
    pub multiple_modes: bool,
}

/// PostgreSQL-style `LOCK TABLE ... IN <mode> MODE [NOWAIT]`.
pub const TABLE_LOCK_SYNTAX: LockSyntax = LockSyntax {
    modes: "ACCESS SHARE|ROW SHARE|ROW EXCLUSIVE|SHARE UPDATE EXCLUSIVE|SHARE|SHARE ROW EXCLUSIVE|EXCLUSIVE|ACCESS EXCLUSIVE",
    wait: Some("NOWAIT"),
    default_modes: &["EXCLUSIVE"],
    multiple_modes: false,
};

/// How a dialect acquires and releases table locks.
pub trait LockStrategy: Precompiler {
    /// Returns the accepted hints, or `None` if the dialect cannot lock tables.
    fn lock_syntax(&self) -> Option<LockSyntax> {
        Some(TABLE_LOCK_SYNTAX)
    }

    /// Renders the lock for one table.
    ///
    /// `table` is already quoted; `modes` is never empty when the syntax has
    /// default modes.
    fn lock_clause(&self, table: &str, modes: &[String], wait: Option<&str>) -> String {
        let mut sql = format!("LOCK TABLE {table} IN {} MODE", modes.join(" "));
        if let Some(wait) = wait {
            sql.push(' ');
            sql.push_str(wait);
        }
        sql
    }

    /// Turns per-table clauses into the statements `acquire()` runs.
    fn lock_statements(&self, clauses: Vec<String>) -> Vec<String> {
        clauses
    }

    /// Statements run before the transaction ends on `release()`.
    fn unlock_statements(&self) -> Vec<String> {
        Vec::new()
    }
}

/// One registered table lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLock {
    /// Raw table name.
    pub table: String,
    /// Recognized mode hints, upper-cased.
    pub modes: Vec<String>,
    /// Recognized wait modifier, upper-cased.
    pub wait: Option<String>,
    /// Rendered lock clause.
    pub clause: String,
}

/// Collects table locks and acquires them in one transaction.
///
/// # Example
///
/// ```rust
/// use oxide_dbal_core::dialect::Dialect;
/// use oxide_dbal_core::lock::LockBuilder;
///
/// let lock = LockBuilder::new(Dialect::PostgreSql)
///     .unwrap()
///     .add("orders", &["NOWAIT"]);
///
/// assert_eq!(
///     lock.commands(),
///     vec![String::from("LOCK TABLE \"orders\" IN EXCLUSIVE MODE NOWAIT")]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct LockBuilder {
    sql: &'static dyn SqlDialect,
    syntax: LockSyntax,
    modes: Regex,
    wait: Option<Regex>,
    locks: Vec<TableLock>,
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?i)^(?:{pattern})$"))
        .map_err(|e| DbalError::Config(format!("invalid lock hint pattern: {e}")))
}

fn normalize_hint(hint: &str) -> String {
    hint.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

impl LockBuilder {
    /// Creates a lock builder for a dialect.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedDialect` for dialects without table locks.
    pub fn new(dialect: Dialect) -> Result<Self> {
        let sql = dialect.sql();
        let syntax = sql.lock_syntax().ok_or(DbalError::UnsupportedDialect {
            dialect,
            feature: "table locks",
        })?;
        Ok(Self {
            sql,
            syntax,
            modes: anchored(syntax.modes)?,
            wait: syntax.wait.map(anchored).transpose()?,
            locks: Vec::new(),
        })
    }

    /// Returns the dialect the locks render for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.sql.dialect()
    }

    /// Registers a lock on `table`.
    ///
    /// Hints matching the dialect's mode pattern select the lock mode, and one
    /// matching its wait pattern sets the wait modifier. Anything else is
    /// ignored. Adding a table twice replaces its lock in place.
    #[must_use]
    pub fn add(mut self, table: &str, hints: &[&str]) -> Self {
        let mut modes: Vec<String> = Vec::new();
        let mut wait = None;
        for hint in hints.iter().map(|hint| normalize_hint(hint)) {
            if self.wait.as_ref().is_some_and(|re| re.is_match(&hint)) {
                wait = Some(hint);
            } else if self.modes.is_match(&hint)
                && (self.syntax.multiple_modes || modes.is_empty())
            {
                if !modes.contains(&hint) {
                    modes.push(hint);
                }
            } else {
                debug!(table, hint = %hint, "Ignoring lock hint");
            }
        }
        if modes.is_empty() {
            modes = self
                .syntax
                .default_modes
                .iter()
                .map(|mode| String::from(*mode))
                .collect();
        }

        let clause = self.sql.lock_clause(
            &self.sql.prepare_identifier(table),
            &modes,
            wait.as_deref(),
        );
        let lock = TableLock {
            table: String::from(table),
            modes,
            wait,
            clause,
        };
        match self.locks.iter_mut().find(|l| l.table == table) {
            Some(existing) => *existing = lock,
            None => self.locks.push(lock),
        }
        self
    }

    /// Returns the registered locks in order.
    #[must_use]
    pub fn locks(&self) -> &[TableLock] {
        &self.locks
    }

    /// Returns the statements `acquire()` runs after beginning the transaction.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        let clauses = self.locks.iter().map(|l| l.clause.clone()).collect();
        self.sql.lock_statements(clauses)
    }

    /// Begins a transaction and runs every lock statement in order.
    ///
    /// A failure part-way leaves the transaction open; the caller decides
    /// whether to release it.
    ///
    /// # Errors
    ///
    /// Returns the connection's error for the first statement that fails.
    pub fn acquire(&self, conn: &mut dyn Connection) -> Result<()> {
        conn.begin_transaction()?;
        for sql in self.commands() {
            debug!(sql = %sql, "Acquiring lock");
            conn.execute(Command::new(sql))?;
        }
        info!(tables = self.locks.len(), "Acquired table locks");
        Ok(())
    }

    /// Ends the lock transaction: rolls back when `method` is `ROLLBACK`
    /// (any case), commits otherwise.
    ///
    /// # Errors
    ///
    /// Returns the connection's error.
    pub fn release(&self, conn: &mut dyn Connection, method: &str) -> Result<()> {
        for sql in self.sql.unlock_statements() {
            debug!(sql = %sql, "Releasing lock");
            conn.execute(Command::new(sql))?;
        }
        if method.trim().eq_ignore_ascii_case("ROLLBACK") {
            conn.rollback()?;
            info!(tables = self.locks.len(), "Released table locks with rollback");
        } else {
            conn.commit()?;
            info!(tables = self.locks.len(), "Released table locks with commit");
        }
        Ok(())
    }

    /// Removes every registered lock.
    pub fn reset(&mut self) {
        self.locks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(dialect: Dialect, table: &str, hints: &[&str]) -> Vec<String> {
        LockBuilder::new(dialect).unwrap().add(table, hints).commands()
    }

    #[test]
    fn test_default_mode_with_nowait() {
        assert_eq!(
            commands(Dialect::PostgreSql, "orders", &["NOWAIT"]),
            vec![String::from("LOCK TABLE \"orders\" IN EXCLUSIVE MODE NOWAIT")]
        );
    }

    #[test]
    fn test_recognized_mode_and_dropped_hints() {
        assert_eq!(
            commands(Dialect::Standard, "t", &["share  row exclusive", "bogus", "EXCLUSIVE"]),
            vec![String::from("LOCK TABLE \"t\" IN SHARE ROW EXCLUSIVE MODE")]
        );
    }

    #[test]
    fn test_insertion_order_and_replacement() {
        let lock = LockBuilder::new(Dialect::PostgreSql)
            .unwrap()
            .add("a", &[])
            .add("b", &["SHARE"])
            .add("a", &["ROW SHARE"]);
        assert_eq!(
            lock.commands(),
            vec![
                String::from("LOCK TABLE \"a\" IN ROW SHARE MODE"),
                String::from("LOCK TABLE \"b\" IN SHARE MODE"),
            ]
        );
    }

    #[test]
    fn test_sqlite_has_no_table_locks() {
        assert!(matches!(
            LockBuilder::new(Dialect::Sqlite),
            Err(DbalError::UnsupportedDialect {
                dialect: Dialect::Sqlite,
                ..
            })
        ));
    }

    #[test]
    fn test_every_other_dialect_has_valid_patterns() {
        for dialect in Dialect::ALL {
            if dialect != Dialect::Sqlite {
                let lock = LockBuilder::new(dialect).unwrap().add("t", &[]);
                assert_eq!(lock.commands().len(), 1, "{dialect}");
            }
        }
    }
}
