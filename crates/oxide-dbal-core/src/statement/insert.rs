//! INSERT statement IR, builder and default renderer.

use super::{terminate, TableRef};
use crate::command::Command;
use crate::connection::Connection;
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{DbalError, Result};
use crate::precompiler::Precompiler;
use crate::value::{SqlValue, ToSqlValue};

/// One INSERT row: raw column names mapped to rendered values, in insertion order.
pub type Row = Vec<(String, String)>;

/// The intermediate representation of an INSERT statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertData {
    /// Target table.
    pub into: Option<TableRef>,
    /// Declared column names, unquoted.
    pub columns: Vec<String>,
    /// Row value mappings.
    pub rows: Vec<Row>,
}

impl InsertData {
    /// Returns the column list every row is rendered against: the declared
    /// columns followed by columns only seen in rows, in first-seen order.
    #[must_use]
    pub fn column_list(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        for row in &self.rows {
            for (column, _) in row {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }
        columns
    }

    /// Returns each row's values aligned to [`InsertData::column_list`], with
    /// `NULL` for missing cells.
    #[must_use]
    pub fn aligned_rows(&self) -> Vec<Vec<&str>> {
        let columns = self.column_list();
        self.rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| {
                        row.iter()
                            .find(|(name, _)| name == column)
                            .map_or("NULL", |(_, value)| value.as_str())
                    })
                    .collect()
            })
            .collect()
    }

    /// Returns the target table or fails if unset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without a target table or without rows.
    pub fn target(&self) -> Result<&TableRef> {
        let into = self
            .into
            .as_ref()
            .ok_or_else(|| DbalError::InvalidArgument(String::from("INSERT without target table")))?;
        if self.rows.is_empty() || self.column_list().is_empty() {
            return Err(DbalError::InvalidArgument(String::from(
                "INSERT without values",
            )));
        }
        Ok(into)
    }
}

/// Renders INSERT statements for one dialect.
pub trait InsertRenderer: Precompiler {
    /// Renders an INSERT statement without terminator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without a target table or rows.
    fn render_insert(&self, data: &InsertData) -> Result<String> {
        let into = data.target()?;
        let rows: Vec<String> = data
            .aligned_rows()
            .iter()
            .map(|values| format!("({})", values.join(", ")))
            .collect();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES {}",
            into.render(self),
            quoted_columns(self, data),
            rows.join(", ")
        ))
    }
}

/// Renders the quoted, comma-separated column list.
pub(crate) fn quoted_columns<P: Precompiler + ?Sized>(pc: &P, data: &InsertData) -> String {
    data.column_list()
        .iter()
        .map(|column| pc.prepare_identifier(column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// An INSERT statement builder.
///
/// # Example
///
/// ```rust
/// use oxide_dbal_core::dialect::Dialect;
/// use oxide_dbal_core::statement::Insert;
/// use oxide_dbal_core::value::SqlValue;
///
/// let sql = Insert::new(Dialect::Standard)
///     .into_table("users")
///     .columns(&["name", "email", "age"])
///     .row(&[("name", SqlValue::Text("Alice".into())), ("age", SqlValue::Int(30))])
///     .statement(true)
///     .unwrap();
///
/// assert_eq!(
///     sql,
///     "INSERT INTO \"users\" (\"name\", \"email\", \"age\") VALUES ('Alice', NULL, 30);"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Insert {
    sql: &'static dyn SqlDialect,
    data: InsertData,
}

impl Insert {
    /// Creates a new INSERT builder for a dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sql: dialect.sql(),
            data: InsertData::default(),
        }
    }

    /// Returns the dialect the statement renders for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.sql.dialect()
    }

    /// Returns the accumulated IR.
    #[must_use]
    pub const fn data(&self) -> &InsertData {
        &self.data
    }

    /// Sets the target table.
    #[must_use]
    pub fn into_table(mut self, table: &str) -> Self {
        self.data.into = Some(TableRef::new(table));
        self
    }

    /// Declares a column.
    #[must_use]
    pub fn column(mut self, name: &str) -> Self {
        if !self.data.columns.iter().any(|c| c == name) {
            self.data.columns.push(String::from(name));
        }
        self
    }

    /// Declares several columns.
    #[must_use]
    pub fn columns(self, names: &[&str]) -> Self {
        names.iter().fold(self, |insert, name| insert.column(name))
    }

    /// Sets a value on the current (last) row, starting one if none exists.
    #[must_use]
    pub fn value<V: ToSqlValue>(mut self, column: &str, value: V) -> Self {
        let rendered = self.sql.prepare_value(&value.to_sql_value());
        if self.data.rows.is_empty() {
            self.data.rows.push(Row::new());
        }
        if let Some(row) = self.data.rows.last_mut() {
            set_cell(row, column, rendered);
        }
        self
    }

    /// Appends a row from column/value pairs.
    #[must_use]
    pub fn row(mut self, values: &[(&str, SqlValue)]) -> Self {
        let mut row = Row::new();
        for (column, value) in values {
            set_cell(&mut row, column, self.sql.prepare_value(value));
        }
        self.data.rows.push(row);
        self
    }

    /// Starts a new empty row for subsequent [`Insert::value`] calls.
    #[must_use]
    pub fn next_row(mut self) -> Self {
        self.data.rows.push(Row::new());
        self
    }

    /// Clears the IR so the builder can be reused.
    pub fn reset(&mut self) {
        self.data = InsertData::default();
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without a target table or rows.
    pub fn statement(&self, terminated: bool) -> Result<String> {
        Ok(terminate(self.sql.render_insert(&self.data)?, terminated))
    }

    /// Renders the statement as a command.
    ///
    /// # Errors
    ///
    /// See [`Insert::statement`].
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

fn set_cell(row: &mut Row, column: &str, value: String) {
    match row.iter_mut().find(|(name, _)| name == column) {
        Some(cell) => cell.1 = value,
        None => row.push((String::from(column), value)),
    }
}
