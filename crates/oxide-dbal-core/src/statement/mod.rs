//! Statement IR and fluent builders.
//!
//! Each builder accumulates an intermediate representation of one statement.
//! Identifiers and values are rendered by the dialect's precompiler as they are
//! added, so the IR holds dialect-correct fragments. Rendering the final text
//! is delegated to the dialect's renderer for that statement kind and never
//! mutates the IR: calling `statement()` twice yields identical SQL.
//!
//! # Example
//!
//! ```rust
//! use oxide_dbal_core::dialect::Dialect;
//! use oxide_dbal_core::statement::{Delete, Filter, Operator, SortOrder};
//!
//! let sql = Delete::new(Dialect::PostgreSql)
//!     .from("sessions")
//!     .where_clause("expired", Operator::Eq, true)
//!     .order_by("id", SortOrder::Asc)
//!     .limit(1)
//!     .statement(true)
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "DELETE FROM \"sessions\" WHERE ctid = any(array(SELECT ctid FROM \"sessions\" \
//!      WHERE \"expired\" = TRUE ORDER BY \"id\" ASC LIMIT 1));"
//! );
//! ```

mod delete;
mod insert;
mod predicate;
mod select;
mod update;

use std::fmt;
use std::str::FromStr;

pub use delete::{Delete, DeleteData, DeleteRenderer};
pub use insert::{Insert, InsertData, InsertRenderer, Row};
pub use predicate::{Filter, Predicates, Term, Token};
pub use select::{Combine, Join, Select, SelectData, SelectRenderer};
pub use update::{Update, UpdateData, UpdateRenderer};

pub(crate) use insert::quoted_columns;
pub(crate) use select::{combine_suffix, select_core};
pub(crate) use update::{set_clause, update_head};

use tracing::debug;

use crate::error::DbalError;
use crate::precompiler::Precompiler;

/// Keyword joining two predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    /// `AND`
    #[default]
    And,
    /// `OR`
    Or,
}

impl Connector {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl FromStr for Connector {
    type Err = DbalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(DbalError::InvalidArgument(format!(
                "unknown connector '{other}'"
            ))),
        }
    }
}

/// Comparison operators accepted by `where`/`having` mutators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `IS`
    Is,
    /// `IS NOT`
    IsNot,
}

impl Operator {
    /// Returns the SQL operator token.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = DbalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Self::Eq),
            "<>" | "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            "IN" => Ok(Self::In),
            "NOT IN" => Ok(Self::NotIn),
            "IS" => Ok(Self::Is),
            "IS NOT" => Ok(Self::IsNot),
            _ => Err(DbalError::InvalidArgument(format!(
                "unknown operator '{s}'"
            ))),
        }
    }
}

/// Join types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// `INNER JOIN`
    #[default]
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `LEFT OUTER JOIN`
    LeftOuter,
    /// `RIGHT JOIN`
    Right,
    /// `RIGHT OUTER JOIN`
    RightOuter,
    /// `FULL JOIN`
    Full,
    /// `FULL OUTER JOIN`
    FullOuter,
    /// `CROSS JOIN`
    Cross,
    /// `NATURAL JOIN`
    Natural,
}

impl JoinType {
    /// Returns the SQL keywords preceding the joined table.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::Right => "RIGHT JOIN",
            Self::RightOuter => "RIGHT OUTER JOIN",
            Self::Full => "FULL JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
        }
    }
}

impl FromStr for JoinType {
    type Err = DbalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let upper = normalized.to_ascii_uppercase();
        let keyword = upper.strip_suffix(" JOIN").unwrap_or(&upper);
        match keyword {
            "" | "JOIN" | "INNER" => Ok(Self::Inner),
            "LEFT" => Ok(Self::Left),
            "LEFT OUTER" => Ok(Self::LeftOuter),
            "RIGHT" => Ok(Self::Right),
            "RIGHT OUTER" => Ok(Self::RightOuter),
            "FULL" => Ok(Self::Full),
            "FULL OUTER" => Ok(Self::FullOuter),
            "CROSS" => Ok(Self::Cross),
            "NATURAL" => Ok(Self::Natural),
            _ => Err(DbalError::InvalidArgument(format!(
                "unknown join type '{s}'"
            ))),
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order (ASC)
    #[default]
    Asc,
    /// Descending order (DESC)
    Desc,
}

impl SortOrder {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DbalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(DbalError::InvalidArgument(format!(
                "unknown sort order '{other}'"
            ))),
        }
    }
}

/// Set operators combining two SELECT statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    /// `UNION`
    Union,
    /// `UNION ALL`
    UnionAll,
    /// `INTERSECT`
    Intersect,
    /// `EXCEPT`
    Except,
}

impl CombineOp {
    /// Returns the SQL keywords.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

impl FromStr for CombineOp {
    type Err = DbalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "UNION" => Ok(Self::Union),
            "UNION ALL" => Ok(Self::UnionAll),
            "INTERSECT" => Ok(Self::Intersect),
            "EXCEPT" | "MINUS" => Ok(Self::Except),
            _ => Err(DbalError::InvalidArgument(format!(
                "unknown combine operator '{s}'"
            ))),
        }
    }
}

/// A target table, optionally aliased.
///
/// Kept unrendered so renderers can reason about the raw names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Table name, possibly schema-qualified.
    pub name: String,
    /// Optional alias.
    pub alias: Option<String>,
}

impl TableRef {
    /// Creates an unaliased table reference.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            alias: None,
        }
    }

    /// Creates an aliased table reference.
    #[must_use]
    pub fn aliased(name: &str, alias: &str) -> Self {
        Self {
            name: String::from(name),
            alias: Some(String::from(alias)),
        }
    }

    /// Renders the table with its alias.
    pub fn render<P: Precompiler + ?Sized>(&self, pc: &P) -> String {
        let table = pc.prepare_identifier(&self.name);
        match &self.alias {
            Some(alias) => format!("{table}{}{}", pc.table_alias_keyword(), pc.prepare_alias(alias)),
            None => table,
        }
    }

    /// Returns the alias if set, otherwise the unqualified table name.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| self.name.rsplit('.').next().unwrap_or(&self.name))
    }
}

/// Renders an ORDER BY term.
pub(crate) fn order_term<P: Precompiler + ?Sized>(pc: &P, column: &str, order: SortOrder) -> String {
    format!("{} {}", pc.prepare_identifier(column), order.as_sql())
}

/// Appends ` ORDER BY ...` when ordering terms are present.
/// Logs an ORDER BY that a dialect drops from an unbounded DELETE or UPDATE.
pub(crate) fn trace_dropped_order(verb: &str, order_by: &[String]) {
    if !order_by.is_empty() {
        debug!(
            verb,
            order_by = %order_by.join(", "),
            "Ignoring ORDER BY on DML without LIMIT or OFFSET"
        );
    }
}

pub(crate) fn push_order_by(sql: &mut String, order_by: &[String]) {
    if !order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by.join(", "));
    }
}

/// Appends ` WHERE ...` when predicates are present.
pub(crate) fn push_where(sql: &mut String, predicates: &Predicates) -> crate::Result<()> {
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.render()?);
    }
    Ok(())
}

/// Appends `LIMIT`/`OFFSET` in the standard form.
pub(crate) fn push_limit_offset(sql: &mut String, limit: u64, offset: u64) {
    if limit > 0 {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
}

/// Appends the statement terminator.
pub(crate) fn terminate(mut sql: String, terminated: bool) -> String {
    if terminated {
        sql.push(';');
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_from_str() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!("not   like".parse::<Operator>().unwrap(), Operator::NotLike);
        assert_eq!("is not".parse::<Operator>().unwrap(), Operator::IsNot);
        assert!(matches!(
            "~~".parse::<Operator>(),
            Err(DbalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_join_type_from_str() {
        assert_eq!("left outer".parse::<JoinType>().unwrap(), JoinType::LeftOuter);
        assert_eq!("LEFT JOIN".parse::<JoinType>().unwrap(), JoinType::Left);
        assert_eq!("".parse::<JoinType>().unwrap(), JoinType::Inner);
        assert!("SIDEWAYS".parse::<JoinType>().is_err());
    }

    #[test]
    fn test_connector_and_sort_order_from_str() {
        assert_eq!("or".parse::<Connector>().unwrap(), Connector::Or);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("xor".parse::<Connector>().is_err());
        assert_eq!("minus".parse::<CombineOp>().unwrap(), CombineOp::Except);
    }

    #[test]
    fn test_table_ref_effective_name() {
        assert_eq!(TableRef::new("public.users").effective_name(), "users");
        assert_eq!(TableRef::aliased("users", "u").effective_name(), "u");
    }
}
