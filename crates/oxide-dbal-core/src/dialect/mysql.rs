//! MySQL and MariaDB dialect.

use super::{Dialect, SqlDialect};
use crate::connection::Connection;
use crate::error::{DbalError, Result};
use crate::lock::{LockStrategy, LockSyntax};
use crate::precompiler::Precompiler;
use crate::statement::{
    combine_suffix, push_limit_offset, push_order_by, push_where, select_core, update_head,
    DeleteData, DeleteRenderer, InsertRenderer, SelectData, SelectRenderer, UpdateData,
    UpdateRenderer,
};

/// Largest row count MySQL accepts; used as LIMIT when only OFFSET is set.
const UNBOUNDED_LIMIT: u64 = u64::MAX;

/// MySQL and MariaDB share quoting and DML rules; the locking syntax differs
/// slightly, so the dialect key is kept.
#[derive(Debug, Clone, Copy)]
pub struct MySqlDialect {
    dialect: Dialect,
}

impl MySqlDialect {
    /// Creates the implementation for [`Dialect::MySql`] or [`Dialect::MariaDb`].
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    fn reject_offset(&self, offset: u64) -> Result<()> {
        if offset > 0 {
            return Err(DbalError::UnsupportedDialect {
                dialect: self.dialect,
                feature: "OFFSET in DELETE/UPDATE",
            });
        }
        Ok(())
    }
}

impl Precompiler for MySqlDialect {
    fn identifier_quotes(&self) -> (char, char) {
        ('`', '`')
    }

    fn string_literal(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 2);
        escaped.push('\'');
        for c in value.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                '\0' => escaped.push_str("\\0"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\x1a' => escaped.push_str("\\Z"),
                c => escaped.push(c),
            }
        }
        escaped.push('\'');
        escaped
    }

    fn timestamp_literal(&self, value: &chrono::NaiveDateTime) -> String {
        self.string_literal(&value.format(crate::value::TIMESTAMP_FORMAT).to_string())
    }
}

impl SelectRenderer for MySqlDialect {
    fn render_select(&self, data: &SelectData) -> Result<String> {
        let mut sql = select_core(self, data, "")?;
        let limit = if data.limit == 0 && data.offset > 0 {
            UNBOUNDED_LIMIT
        } else {
            data.limit
        };
        push_limit_offset(&mut sql, limit, data.offset);
        sql.push_str(&combine_suffix(self, data)?);
        Ok(sql)
    }
}

impl InsertRenderer for MySqlDialect {}

impl UpdateRenderer for MySqlDialect {
    fn render_update(&self, data: &UpdateData, _conn: Option<&mut dyn Connection>) -> Result<String> {
        self.reject_offset(data.offset)?;
        let mut sql = update_head(self, data)?;
        push_where(&mut sql, &data.where_clause)?;
        push_order_by(&mut sql, &data.order_by);
        push_limit_offset(&mut sql, data.limit, 0);
        Ok(sql)
    }
}

impl DeleteRenderer for MySqlDialect {
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        self.reject_offset(data.offset)?;
        let mut sql = format!("DELETE FROM {}", data.target()?.render(self));
        push_where(&mut sql, &data.where_clause)?;
        push_order_by(&mut sql, &data.order_by);
        push_limit_offset(&mut sql, data.limit, 0);
        Ok(sql)
    }
}

impl LockStrategy for MySqlDialect {
    fn lock_syntax(&self) -> Option<LockSyntax> {
        Some(LockSyntax {
            modes: "READ|READ LOCAL|WRITE|LOW_PRIORITY WRITE",
            wait: match self.dialect {
                Dialect::MariaDb => Some(r"NOWAIT|WAIT \d+"),
                _ => None,
            },
            default_modes: &["WRITE"],
            multiple_modes: false,
        })
    }

    fn lock_clause(&self, table: &str, modes: &[String], wait: Option<&str>) -> String {
        let mut clause = format!("{table} {}", modes.join(" "));
        if let Some(wait) = wait {
            clause.push(' ');
            clause.push_str(wait);
        }
        clause
    }

    // A second LOCK TABLES releases the first, so every table goes in one statement.
    fn lock_statements(&self, clauses: Vec<String>) -> Vec<String> {
        if clauses.is_empty() {
            return clauses;
        }
        vec![format!("LOCK TABLES {}", clauses.join(", "))]
    }

    fn unlock_statements(&self) -> Vec<String> {
        vec![String::from("UNLOCK TABLES")]
    }
}

impl SqlDialect for MySqlDialect {
    fn dialect(&self) -> Dialect {
        self.dialect
    }
}
