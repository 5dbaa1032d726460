//! DELETE statement IR, builder and default renderer.

use super::predicate::{Filter, Predicates};
use super::{order_term, push_limit_offset, push_order_by, push_where, terminate, SortOrder, TableRef};
use crate::command::Command;
use crate::connection::Connection;
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{DbalError, Result};
use crate::precompiler::Precompiler;

/// The intermediate representation of a DELETE statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteData {
    /// Target table.
    pub from: Option<TableRef>,
    /// WHERE predicates.
    pub where_clause: Predicates,
    /// Rendered ORDER BY terms.
    pub order_by: Vec<String>,
    /// Row limit; 0 means none.
    pub limit: u64,
    /// Row offset; 0 means none.
    pub offset: u64,
}

impl DeleteData {
    /// Returns the target table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when no table was set.
    pub fn target(&self) -> Result<&TableRef> {
        self.from
            .as_ref()
            .ok_or_else(|| DbalError::InvalidArgument(String::from("DELETE without target table")))
    }

    /// Returns true when ORDER BY, LIMIT or OFFSET is set.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        !self.order_by.is_empty() || self.limit > 0 || self.offset > 0
    }
}

/// Renders DELETE statements for one dialect.
pub trait DeleteRenderer: Precompiler {
    /// Renders a DELETE statement without terminator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without a target table.
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", data.target()?.render(self));
        push_where(&mut sql, &data.where_clause)?;
        push_order_by(&mut sql, &data.order_by);
        push_limit_offset(&mut sql, data.limit, data.offset);
        Ok(sql)
    }
}

/// A DELETE statement builder.
///
/// # Example
///
/// ```rust
/// use oxide_dbal_core::dialect::Dialect;
/// use oxide_dbal_core::statement::{Delete, Filter, Operator};
///
/// let sql = Delete::new(Dialect::Standard)
///     .from("users")
///     .where_clause("id", Operator::Eq, 1)
///     .statement(true)
///     .unwrap();
///
/// assert_eq!(sql, "DELETE FROM \"users\" WHERE \"id\" = 1;");
/// ```
#[derive(Debug, Clone)]
pub struct Delete {
    sql: &'static dyn SqlDialect,
    data: DeleteData,
}

impl Delete {
    /// Creates a new DELETE builder for a dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sql: dialect.sql(),
            data: DeleteData::default(),
        }
    }

    /// Returns the dialect the statement renders for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.sql.dialect()
    }

    /// Returns the accumulated IR.
    #[must_use]
    pub const fn data(&self) -> &DeleteData {
        &self.data
    }

    /// Sets the target table.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.data.from = Some(TableRef::new(table));
        self
    }

    /// Sets an aliased target table.
    #[must_use]
    pub fn from_as(mut self, table: &str, alias: &str) -> Self {
        self.data.from = Some(TableRef::aliased(table, alias));
        self
    }

    /// Adds an ORDER BY column.
    ///
    /// Ordering picks which rows a LIMIT or OFFSET touches. Dialects that
    /// rewrite bounded statements (MS SQL, Oracle, DB2) drop it when neither
    /// is set.
    #[must_use]
    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.data.order_by.push(order_term(self.sql, column, order));
        self
    }

    /// Sets the row limit; 0 removes it.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.data.limit = limit;
        self
    }

    /// Sets the row offset; 0 removes it.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.data.offset = offset;
        self
    }

    /// Clears the IR so the builder can be reused.
    pub fn reset(&mut self) {
        self.data = DeleteData::default();
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without a target table, or
    /// `UnsupportedDialect` for a bound the dialect cannot express.
    pub fn statement(&self, terminated: bool) -> Result<String> {
        Ok(terminate(self.sql.render_delete(&self.data)?, terminated))
    }

    /// Renders the statement as a command.
    ///
    /// # Errors
    ///
    /// See [`Delete::statement`].
    pub fn command(&self) -> Result<Command> {
        Ok(Command::new(self.statement(false)?))
    }

    /// Executes the statement, returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns rendering errors or the driver's `Query` error.
    pub fn execute(&self, conn: &mut dyn Connection) -> Result<u64> {
        conn.execute(self.command()?)
    }
}

impl Filter for Delete {
    fn where_parts(&mut self) -> (&'static dyn SqlDialect, &mut Predicates) {
        (self.sql, &mut self.data.where_clause)
    }
}
