//! UPDATE statement IR, builder and default renderer.

use super::predicate::{Filter, Predicates};
use super::{order_term, push_limit_offset, push_order_by, push_where, terminate, SortOrder, TableRef};
use crate::command::Command;
use crate::connection::Connection;
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{DbalError, Result};
use crate::precompiler::Precompiler;
use crate::value::{SqlValue, ToSqlValue};

/// The intermediate representation of an UPDATE statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateData {
    /// Target table.
    pub table: Option<TableRef>,
    /// Assignments: raw column names and rendered values, in SET order.
    pub set: Vec<(String, String)>,
    /// WHERE predicates.
    pub where_clause: Predicates,
    /// Rendered ORDER BY terms.
    pub order_by: Vec<String>,
    /// Row limit; 0 means none.
    pub limit: u64,
    /// Row offset; 0 means none.
    pub offset: u64,
}

impl UpdateData {
    /// Returns the target table, failing when unset or when nothing is assigned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument`.
    pub fn target(&self) -> Result<&TableRef> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| DbalError::InvalidArgument(String::from("UPDATE without target table")))?;
        if self.set.is_empty() {
            return Err(DbalError::InvalidArgument(String::from(
                "UPDATE without assignments",
            )));
        }
        Ok(table)
    }

    /// Returns true when ORDER BY, LIMIT or OFFSET is set.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        !self.order_by.is_empty() || self.limit > 0 || self.offset > 0
    }
}

/// Renders UPDATE statements for one dialect.
pub trait UpdateRenderer: Precompiler {
    /// Renders an UPDATE statement without terminator.
    ///
    /// A connection is passed when the dialect may need to inspect table
    /// metadata first; renderers that do not need one ignore it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without a target or assignments, or errors
    /// raised by a metadata probe.
    fn render_update(&self, data: &UpdateData, _conn: Option<&mut dyn Connection>) -> Result<String> {
        let mut sql = update_head(self, data)?;
        push_where(&mut sql, &data.where_clause)?;
        push_order_by(&mut sql, &data.order_by);
        push_limit_offset(&mut sql, data.limit, data.offset);
        Ok(sql)
    }
}

/// Renders the SET list.
pub(crate) fn set_clause<P: Precompiler + ?Sized>(pc: &P, set: &[(String, String)]) -> String {
    set.iter()
        .map(|(column, value)| format!("{} = {value}", pc.prepare_identifier(column)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders `UPDATE <table> SET ...`.
pub(crate) fn update_head<P: Precompiler + ?Sized>(pc: &P, data: &UpdateData) -> Result<String> {
    let table = data.target()?;
    Ok(format!(
        "UPDATE {} SET {}",
        table.render(pc),
        set_clause(pc, &data.set)
    ))
}

/// An UPDATE statement builder.
///
/// # Example
///
/// ```rust
/// use oxide_dbal_core::dialect::Dialect;
/// use oxide_dbal_core::statement::{Filter, Operator, Update};
///
/// let sql = Update::new(Dialect::Standard)
///     .table("users")
///     .set("name", "Bob")
///     .where_clause("id", Operator::Eq, 1)
///     .statement(true)
///     .unwrap();
///
/// assert_eq!(sql, "UPDATE \"users\" SET \"name\" = 'Bob' WHERE \"id\" = 1;");
/// ```
#[derive(Debug, Clone)]
pub struct Update {
    sql: &'static dyn SqlDialect,
    data: UpdateData,
}

impl Update {
    /// Creates a new UPDATE builder for a dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sql: dialect.sql(),
            data: UpdateData::default(),
        }
    }

    /// Returns the dialect the statement renders for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.sql.dialect()
    }

    /// Returns the accumulated IR.
    #[must_use]
    pub const fn data(&self) -> &UpdateData {
        &self.data
    }

    /// Sets the target table.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        self.data.table = Some(TableRef::new(table));
        self
    }

    /// Sets an aliased target table.
    #[must_use]
    pub fn table_as(mut self, table: &str, alias: &str) -> Self {
        self.data.table = Some(TableRef::aliased(table, alias));
        self
    }

    /// Assigns a value to a column. Assigning the same column again replaces
    /// the value in place.
    #[must_use]
    pub fn set<V: ToSqlValue>(mut self, column: &str, value: V) -> Self {
        let rendered = self.sql.prepare_value(&value.to_sql_value());
        match self.data.set.iter_mut().find(|(name, _)| name == column) {
            Some(assignment) => assignment.1 = rendered,
            None => self.data.set.push((String::from(column), rendered)),
        }
        self
    }

    /// Assigns a raw SQL expression to a column.
    ///
    /// **Warning**: the expression is not escaped.
    #[must_use]
    pub fn set_raw(self, column: &str, expr: &str) -> Self {
        self.set(column, SqlValue::Raw(String::from(expr)))
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
        self.data = UpdateData::default();
    }

    /// Renders the statement without consulting the database.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without a target or assignments, or
    /// `UnsupportedDialect` for a bound the dialect cannot express.
    pub fn statement(&self, terminated: bool) -> Result<String> {
        Ok(terminate(self.sql.render_update(&self.data, None)?, terminated))
    }

    /// Renders the statement as a command without consulting the database.
    ///
    /// # Errors
    ///
    /// See [`Update::statement`].
    pub fn command(&self) -> Result<Command> {
        Ok(Command::new(self.statement(false)?))
    }

    /// Renders the statement as a command, letting the dialect inspect table
    /// metadata over `conn` first.
    ///
    /// # Errors
    ///
    /// See [`Update::statement`]; metadata queries may also fail with `Query`.
    pub fn command_on(&self, conn: &mut dyn Connection) -> Result<Command> {
        Ok(Command::new(self.sql.render_update(&self.data, Some(conn))?))
    }

    /// Executes the statement, returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns rendering errors or the driver's `Query` error.
    pub fn execute(&self, conn: &mut dyn Connection) -> Result<u64> {
        let command = self.command_on(conn)?;
        conn.execute(command)
    }
}

impl Filter for Update {
    fn where_parts(&mut self) -> (&'static dyn SqlDialect, &mut Predicates) {
        (self.sql, &mut self.data.where_clause)
    }
}
