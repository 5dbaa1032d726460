//! SELECT statement IR, builder and default renderer.

use super::predicate::{comparison, Filter, Predicates};
use super::{
    order_term, push_limit_offset, push_order_by, push_where, terminate, CombineOp, Connector,
    JoinType, Operator, SortOrder,
};
use crate::command::Command;
use crate::connection::Connection;
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{DbalError, Result};
use crate::precompiler::Precompiler;
use crate::reader::{DataReader, FromRecord, ResultSet};
use crate::value::ToSqlValue;

/// A join clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Join keyword.
    pub kind: JoinType,
    /// Rendered table (with alias).
    pub table: String,
    /// Rendered ON predicates, combined with AND.
    pub on: Vec<String>,
    /// Rendered USING columns.
    pub using: Vec<String>,
}

impl Join {
    /// Renders the join clause.
    #[must_use]
    pub fn render(&self) -> String {
        let mut sql = format!("{} {}", self.kind.as_sql(), self.table);
        if !self.on.is_empty() {
            sql.push_str(" ON (");
            sql.push_str(&self.on.join(" AND "));
            sql.push(')');
        } else if !self.using.is_empty() {
            sql.push_str(" USING (");
            sql.push_str(&self.using.join(", "));
            sql.push(')');
        }
        sql
    }
}

/// A SELECT combined into another one.
#[derive(Debug, Clone, PartialEq)]
pub struct Combine {
    /// Set operator.
    pub op: CombineOp,
    /// The combined statement.
    pub select: SelectData,
}

/// The intermediate representation of a SELECT statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectData {
    /// Whether DISTINCT is set.
    pub distinct: bool,
    /// Rendered column expressions, in SELECT order.
    pub columns: Vec<String>,
    /// Rendered sources; more than one means a cross join.
    pub from: Vec<String>,
    /// Join clauses in order.
    pub joins: Vec<Join>,
    /// WHERE predicates.
    pub where_clause: Predicates,
    /// Rendered GROUP BY expressions.
    pub group_by: Vec<String>,
    /// HAVING predicates.
    pub having: Predicates,
    /// Rendered ORDER BY terms.
    pub order_by: Vec<String>,
    /// Row limit; 0 means none.
    pub limit: u64,
    /// Row offset; 0 means none.
    pub offset: u64,
    /// Combined statements appended after ORDER BY/LIMIT.
    pub combine: Vec<Combine>,
}

/// Renders SELECT statements for one dialect.
pub trait SelectRenderer: Precompiler {
    /// Table selected from when a statement has no FROM clause.
    fn dummy_table(&self) -> Option<&'static str> {
        None
    }

    /// Renders a SELECT statement without terminator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for malformed predicate lists.
    fn render_select(&self, data: &SelectData) -> Result<String> {
        let mut sql = select_core(self, data, "")?;
        push_limit_offset(&mut sql, data.limit, data.offset);
        sql.push_str(&combine_suffix(self, data)?);
        Ok(sql)
    }
}

/// Renders everything up to and including ORDER BY.
///
/// `head` is inserted between `SELECT [DISTINCT]` and the column list, where
/// some dialects place their row-limiting keywords.
pub(crate) fn select_core<R: SelectRenderer + ?Sized>(
    renderer: &R,
    data: &SelectData,
    head: &str,
) -> Result<String> {
    let mut sql = String::from("SELECT ");
    if data.distinct {
        sql.push_str("DISTINCT ");
    }
    sql.push_str(head);

    if data.columns.is_empty() {
        sql.push('*');
    } else {
        sql.push_str(&data.columns.join(", "));
    }

    if !data.from.is_empty() {
        sql.push_str(" FROM ");
        sql.push_str(&data.from.join(", "));
    } else if let Some(dummy) = renderer.dummy_table() {
        sql.push_str(" FROM ");
        sql.push_str(dummy);
    }

    for join in &data.joins {
        sql.push(' ');
        sql.push_str(&join.render());
    }

    push_where(&mut sql, &data.where_clause)?;

    if !data.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&data.group_by.join(", "));
    }

    if !data.having.is_empty() {
        sql.push_str(" HAVING ");
        sql.push_str(&data.having.render()?);
    }

    push_order_by(&mut sql, &data.order_by);
    Ok(sql)
}

/// Renders the combined statements, each through the same renderer.
pub(crate) fn combine_suffix<R: SelectRenderer + ?Sized>(
    renderer: &R,
    data: &SelectData,
) -> Result<String> {
    let mut sql = String::new();
    for combine in &data.combine {
        sql.push(' ');
        sql.push_str(combine.op.as_sql());
        sql.push(' ');
        sql.push_str(&renderer.render_select(&combine.select)?);
    }
    Ok(sql)
}

/// A SELECT statement builder.
///
/// # Example
///
/// ```rust
/// use oxide_dbal_core::dialect::Dialect;
/// use oxide_dbal_core::statement::{Filter, Operator, Select, SortOrder};
///
/// let sql = Select::new(Dialect::MySql)
///     .column("id")
///     .column_as("name", "username")
///     .from("users")
///     .where_clause("active", Operator::Eq, true)
///     .order_by("name", SortOrder::Asc)
///     .limit(10)
///     .statement(false)
///     .unwrap();
///
/// assert_eq!(
///     sql,
///     "SELECT `id`, `name` AS `username` FROM `users` WHERE `active` = TRUE ORDER BY `name` ASC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    sql: &'static dyn SqlDialect,
    data: SelectData,
    misuse: Option<String>,
}

impl Select {
    /// Creates a new SELECT builder for a dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sql: dialect.sql(),
            data: SelectData::default(),
            misuse: None,
        }
    }

    /// Returns the dialect the statement renders for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.sql.dialect()
    }

    /// Returns the accumulated IR.
    #[must_use]
    pub const fn data(&self) -> &SelectData {
        &self.data
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self, distinct: bool) -> Self {
        self.data.distinct = distinct;
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, name: &str) -> Self {
        self.data.columns.push(self.sql.prepare_identifier(name));
        self
    }

    /// Adds several columns.
    #[must_use]
    pub fn columns(mut self, names: &[&str]) -> Self {
        for name in names {
            self.data.columns.push(self.sql.prepare_identifier(name));
        }
        self
    }

    /// Adds an aliased column.
    #[must_use]
    pub fn column_as(mut self, name: &str, alias: &str) -> Self {
        let column = format!(
            "{} AS {}",
            self.sql.prepare_identifier(name),
            self.sql.prepare_alias(alias)
        );
        self.data.columns.push(column);
        self
    }

    /// Adds a raw column expression, optionally aliased.
    ///
    /// **Warning**: the expression is not escaped.
    #[must_use]
    pub fn column_expr(mut self, expr: &str, alias: Option<&str>) -> Self {
        let column = match alias {
            Some(alias) => format!("{expr} AS {}", self.sql.prepare_alias(alias)),
            None => String::from(expr),
        };
        self.data.columns.push(column);
        self
    }

    /// Adds a source table.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.data.from.push(self.sql.prepare_identifier(table));
        self
    }

    /// Adds an aliased source table.
    #[must_use]
    pub fn from_as(mut self, table: &str, alias: &str) -> Self {
        let source = super::TableRef::aliased(table, alias).render(self.sql);
        self.data.from.push(source);
        self
    }

    /// Adds a raw source, such as a parenthesized subquery.
    ///
    /// **Warning**: the text is not escaped.
    #[must_use]
    pub fn from_raw(mut self, source: &str) -> Self {
        self.data.from.push(String::from(source));
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(mut self, table: &str, kind: JoinType) -> Self {
        self.data.joins.push(Join {
            kind,
            table: self.sql.prepare_identifier(table),
            on: Vec::new(),
            using: Vec::new(),
        });
        self
    }

    /// Adds a join on an aliased table.
    #[must_use]
    pub fn join_as(mut self, table: &str, alias: &str, kind: JoinType) -> Self {
        let table = super::TableRef::aliased(table, alias).render(self.sql);
        self.data.joins.push(Join {
            kind,
            table,
            on: Vec::new(),
            using: Vec::new(),
        });
        self
    }

    /// Adds an ON condition comparing two columns to the last join.
    #[must_use]
    pub fn on(mut self, left: &str, op: Operator, right: &str) -> Self {
        let predicate = format!(
            "{} {op} {}",
            self.sql.prepare_identifier(left),
            self.sql.prepare_identifier(right)
        );
        match self.data.joins.last_mut() {
            Some(join) => join.on.push(predicate),
            None => self.misuse = Some(String::from("ON condition without a preceding join")),
        }
        self
    }

    /// Adds a USING column to the last join.
    #[must_use]
    pub fn using(mut self, column: &str) -> Self {
        let column = self.sql.prepare_identifier(column);
        match self.data.joins.last_mut() {
            Some(join) => join.using.push(column),
            None => self.misuse = Some(String::from("USING column without a preceding join")),
        }
        self
    }

    /// Adds a GROUP BY column.
    #[must_use]
    pub fn group_by(mut self, column: &str) -> Self {
        self.data.group_by.push(self.sql.prepare_identifier(column));
        self
    }

    /// Adds a HAVING predicate joined with AND.
    #[must_use]
    pub fn having_clause<V: ToSqlValue>(self, column: &str, op: Operator, value: V) -> Self {
        self.having_with(Connector::And, column, op, value)
    }

    /// Adds a HAVING predicate joined with OR.
    #[must_use]
    pub fn or_having<V: ToSqlValue>(self, column: &str, op: Operator, value: V) -> Self {
        self.having_with(Connector::Or, column, op, value)
    }

    /// Adds a HAVING predicate joined with the given connector.
    #[must_use]
    pub fn having_with<V: ToSqlValue>(
        mut self,
        connector: Connector,
        column: &str,
        op: Operator,
        value: V,
    ) -> Self {
        let predicate = comparison(self.sql, column, op, &value.to_sql_value());
        self.data.having.push(connector, predicate);
        self
    }

    /// Adds a raw HAVING predicate, e.g. on an aggregate.
    ///
    /// **Warning**: the text is not escaped.
    #[must_use]
    pub fn having_raw(mut self, connector: Connector, sql: &str) -> Self {
        self.data.having.push(connector, String::from(sql));
        self
    }

    /// Opens a parenthesized HAVING group.
    #[must_use]
    pub fn having_open(mut self, connector: Connector) -> Self {
        self.data.having.open(connector);
        self
    }

    /// Closes the innermost HAVING group.
    #[must_use]
    pub fn having_close(mut self) -> Self {
        self.data.having.close();
        self
    }

    /// Adds an ORDER BY column.
    #[must_use]
    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.data.order_by.push(order_term(self.sql, column, order));
        self
    }

    /// Adds a raw ORDER BY term.
    #[must_use]
    pub fn order_by_raw(mut self, expr: &str) -> Self {
        self.data.order_by.push(String::from(expr));
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

    /// Appends another SELECT with a set operator.
    #[must_use]
    pub fn combine(mut self, op: CombineOp, other: &Self) -> Self {
        self.data.combine.push(Combine {
            op,
            select: other.data.clone(),
        });
        self
    }

    /// Clears the IR so the builder can be reused.
    pub fn reset(&mut self) {
        self.data = SelectData::default();
        self.misuse = None;
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the builder was misused or the predicate
    /// lists are malformed.
    pub fn statement(&self, terminated: bool) -> Result<String> {
        if let Some(misuse) = &self.misuse {
            return Err(DbalError::InvalidArgument(misuse.clone()));
        }
        Ok(terminate(self.sql.render_select(&self.data)?, terminated))
    }

    /// Renders the statement as a command.
    ///
    /// # Errors
    ///
    /// See [`Select::statement`].
    pub fn command(&self) -> Result<Command> {
        Ok(Command::new(self.statement(false)?))
    }

    /// Executes the statement and returns a reader over its rows.
    ///
    /// # Errors
    ///
    /// Returns rendering errors or the driver's `Query` error.
    pub fn query(&self, conn: &mut dyn Connection) -> Result<DataReader> {
        DataReader::new(conn, self.command()?)
    }

    /// Executes the statement and returns typed rows.
    ///
    /// # Errors
    ///
    /// See [`Select::query`].
    pub fn query_as<T: FromRecord>(&self, conn: &mut dyn Connection) -> Result<ResultSet<T>> {
        Ok(ResultSet::new(self.query(conn)?))
    }
}

impl Filter for Select {
    fn where_parts(&mut self) -> (&'static dyn SqlDialect, &mut Predicates) {
        (self.sql, &mut self.data.where_clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_star_when_no_columns() {
        let sql = Select::new(Dialect::Standard)
            .from("users")
            .statement(true)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"users\";");
    }

    #[test]
    fn test_select_full_clause_order() {
        let sql = Select::new(Dialect::PostgreSql)
            .distinct(true)
            .column("u.id")
            .column_expr("COUNT(*)", Some("orders"))
            .from_as("users", "u")
            .join_as("orders", "o", JoinType::Left)
            .on("o.user_id", Operator::Eq, "u.id")
            .where_clause("u.active", Operator::Eq, true)
            .group_by("u.id")
            .having_raw(Connector::And, "COUNT(*) > 2")
            .order_by("u.id", SortOrder::Desc)
            .limit(5)
            .offset(10)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT DISTINCT \"u\".\"id\", COUNT(*) AS \"orders\" FROM \"users\" AS \"u\" \
             LEFT JOIN \"orders\" AS \"o\" ON (\"o\".\"user_id\" = \"u\".\"id\") \
             WHERE \"u\".\"active\" = TRUE GROUP BY \"u\".\"id\" HAVING COUNT(*) > 2 \
             ORDER BY \"u\".\"id\" DESC LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_multiple_sources_cross_join() {
        let sql = Select::new(Dialect::Standard)
            .from("a")
            .from("b")
            .statement(false)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"a\", \"b\"");
    }

    #[test]
    fn test_join_using() {
        let sql = Select::new(Dialect::Standard)
            .from("a")
            .join("b", JoinType::Inner)
            .using("id")
            .using("tenant")
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"a\" INNER JOIN \"b\" USING (\"id\", \"tenant\")"
        );
    }

    #[test]
    fn test_on_without_join_is_reported() {
        let select = Select::new(Dialect::Standard)
            .from("a")
            .on("a.id", Operator::Eq, "b.id");
        assert!(matches!(
            select.statement(false),
            Err(DbalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_grouped_where_clause() {
        let sql = Select::new(Dialect::Standard)
            .from("t")
            .where_clause("a", Operator::Eq, 1)
            .where_open(Connector::And)
            .where_clause("b", Operator::Eq, 2)
            .or_where("c", Operator::Eq, 3)
            .where_close()
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"t\" WHERE \"a\" = 1 AND (\"b\" = 2 OR \"c\" = 3)"
        );
    }

    #[test]
    fn test_where_in_and_between() {
        let sql = Select::new(Dialect::Standard)
            .from("t")
            .where_in("id", [1, 2, 3])
            .where_between("created", "2024-01-01", "2024-12-31")
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"t\" WHERE \"id\" IN (1, 2, 3) AND \"created\" BETWEEN '2024-01-01' AND '2024-12-31'"
        );
    }

    #[test]
    fn test_combine_is_appended_after_limit() {
        let other = Select::new(Dialect::Standard).column("id").from("archived");
        let sql = Select::new(Dialect::Standard)
            .column("id")
            .from("live")
            .limit(3)
            .combine(CombineOp::UnionAll, &other)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"id\" FROM \"live\" LIMIT 3 UNION ALL SELECT \"id\" FROM \"archived\""
        );
    }

    #[test]
    fn test_render_is_idempotent_and_reset_clears() {
        let mut select = Select::new(Dialect::Standard)
            .from("t")
            .where_clause("a", Operator::Eq, 1)
            .or_where("b", Operator::Eq, 2);
        let first = select.statement(true).unwrap();
        let second = select.statement(true).unwrap();
        assert_eq!(first, second);

        select.reset();
        assert_eq!(select.data(), &SelectData::default());
        assert_eq!(select.statement(false).unwrap(), "SELECT *");
    }
}
