//! WHERE/HAVING predicate lists.
//!
//! A predicate list is an ordered sequence of terms, each holding an optional
//! connector and a token. Tokens are either rendered predicates or parenthesis
//! sentinels. The connector is decided when a term is pushed: none for the
//! first term at a nesting depth or right after `(`, and never for `)`.

use super::{Connector, Operator};
use crate::dialect::SqlDialect;
use crate::error::{DbalError, Result};
use crate::precompiler::Precompiler;
use crate::value::{SqlValue, ToSqlValue};

/// One token of a predicate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opening parenthesis.
    Open,
    /// Closing parenthesis.
    Close,
    /// A rendered predicate.
    Predicate(String),
}

/// A token together with the connector printed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Connector preceding the token, if any.
    pub connector: Option<Connector>,
    /// The token itself.
    pub token: Token,
}

/// An ordered predicate list for a WHERE or HAVING clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicates {
    terms: Vec<Term>,
}

impl Predicates {
    /// Creates an empty predicate list.
    #[must_use]
    pub const fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Returns true if no term was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the terms in insertion order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Removes every term.
    pub fn clear(&mut self) {
        self.terms.clear();
    }

    fn connector_for(&self, connector: Connector) -> Option<Connector> {
        match self.terms.last() {
            None
            | Some(Term {
                token: Token::Open, ..
            }) => None,
            Some(_) => Some(connector),
        }
    }

    /// Appends a rendered predicate.
    pub fn push(&mut self, connector: Connector, predicate: String) {
        let connector = self.connector_for(connector);
        self.terms.push(Term {
            connector,
            token: Token::Predicate(predicate),
        });
    }

    /// Opens a parenthesized group.
    pub fn open(&mut self, connector: Connector) {
        let connector = self.connector_for(connector);
        self.terms.push(Term {
            connector,
            token: Token::Open,
        });
    }

    /// Closes the innermost group.
    pub fn close(&mut self) {
        self.terms.push(Term {
            connector: None,
            token: Token::Close,
        });
    }

    /// Renders the list without the leading keyword.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for unbalanced or empty groups.
    pub fn render(&self) -> Result<String> {
        let mut sql = String::new();
        let mut depth = 0_usize;
        let mut previous: Option<&Token> = None;

        for term in &self.terms {
            if let Some(connector) = term.connector {
                sql.push(' ');
                sql.push_str(connector.as_sql());
                sql.push(' ');
            }
            match &term.token {
                Token::Open => {
                    depth += 1;
                    sql.push('(');
                }
                Token::Close => {
                    if depth == 0 {
                        return Err(DbalError::InvalidArgument(String::from(
                            "closing parenthesis without a matching opening one",
                        )));
                    }
                    if matches!(previous, Some(Token::Open)) {
                        return Err(DbalError::InvalidArgument(String::from(
                            "empty parenthesized predicate group",
                        )));
                    }
                    depth -= 1;
                    sql.push(')');
                }
                Token::Predicate(predicate) => sql.push_str(predicate),
            }
            previous = Some(&term.token);
        }

        if depth != 0 {
            return Err(DbalError::InvalidArgument(format!(
                "{depth} unclosed parenthesis in predicate list"
            )));
        }
        Ok(sql)
    }
}

/// Renders `column <op> value`, turning equality against NULL into `IS [NOT] NULL`.
pub(crate) fn comparison<P: Precompiler + ?Sized>(
    pc: &P,
    column: &str,
    op: Operator,
    value: &SqlValue,
) -> String {
    let column = pc.prepare_identifier(column);
    match (op, value) {
        (Operator::Eq | Operator::Is, SqlValue::Null) => format!("{column} IS NULL"),
        (Operator::Ne | Operator::IsNot, SqlValue::Null) => format!("{column} IS NOT NULL"),
        (Operator::In | Operator::NotIn, value) => {
            format!("{column} {op} ({})", pc.prepare_value(value))
        }
        (op, value) => format!("{column} {op} {}", pc.prepare_value(value)),
    }
}

/// Renders `column [NOT] IN (v1, v2, ...)`.
pub(crate) fn in_list<P: Precompiler + ?Sized>(
    pc: &P,
    column: &str,
    values: &[SqlValue],
    negated: bool,
) -> String {
    if values.is_empty() {
        // IN () is not valid SQL; keep the truth value instead.
        return String::from(if negated { "1 = 1" } else { "1 = 0" });
    }
    let rendered: Vec<String> = values.iter().map(|v| pc.prepare_value(v)).collect();
    let keyword = if negated { "NOT IN" } else { "IN" };
    format!(
        "{} {keyword} ({})",
        pc.prepare_identifier(column),
        rendered.join(", ")
    )
}

fn between<P: Precompiler + ?Sized>(
    pc: &P,
    column: &str,
    low: &SqlValue,
    high: &SqlValue,
    negated: bool,
) -> String {
    format!(
        "{} {}BETWEEN {} AND {}",
        pc.prepare_identifier(column),
        if negated { "NOT " } else { "" },
        pc.prepare_value(low),
        pc.prepare_value(high)
    )
}

/// Mutators shared by every statement with a WHERE clause.
///
/// Identifiers and values are rendered through the statement's dialect as they
/// are added. Raw predicates are emitted verbatim.
pub trait Filter: Sized {
    /// Returns the dialect and the WHERE predicate list of the statement.
    fn where_parts(&mut self) -> (&'static dyn SqlDialect, &mut Predicates);

    /// Adds a predicate joined with AND.
    #[must_use]
    fn where_clause<V: ToSqlValue>(self, column: &str, op: Operator, value: V) -> Self {
        self.where_with(Connector::And, column, op, value)
    }

    /// Adds a predicate joined with OR.
    #[must_use]
    fn or_where<V: ToSqlValue>(self, column: &str, op: Operator, value: V) -> Self {
        self.where_with(Connector::Or, column, op, value)
    }

    /// Adds a predicate joined with the given connector.
    #[must_use]
    fn where_with<V: ToSqlValue>(
        mut self,
        connector: Connector,
        column: &str,
        op: Operator,
        value: V,
    ) -> Self {
        let (sql, predicates) = self.where_parts();
        let predicate = comparison(sql, column, op, &value.to_sql_value());
        predicates.push(connector, predicate);
        self
    }

    /// Adds `column IN (...)` joined with AND.
    #[must_use]
    fn where_in<V, I>(mut self, column: &str, values: I) -> Self
    where
        V: ToSqlValue,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        let (sql, predicates) = self.where_parts();
        predicates.push(Connector::And, in_list(sql, column, &values, false));
        self
    }

    /// Adds `column NOT IN (...)` joined with AND.
    #[must_use]
    fn where_not_in<V, I>(mut self, column: &str, values: I) -> Self
    where
        V: ToSqlValue,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        let (sql, predicates) = self.where_parts();
        predicates.push(Connector::And, in_list(sql, column, &values, true));
        self
    }

    /// Adds `column BETWEEN low AND high` joined with AND.
    #[must_use]
    fn where_between<L: ToSqlValue, H: ToSqlValue>(mut self, column: &str, low: L, high: H) -> Self {
        let (sql, predicates) = self.where_parts();
        let predicate = between(sql, column, &low.to_sql_value(), &high.to_sql_value(), false);
        predicates.push(Connector::And, predicate);
        self
    }

    /// Adds `column NOT BETWEEN low AND high` joined with AND.
    #[must_use]
    fn where_not_between<L: ToSqlValue, H: ToSqlValue>(
        mut self,
        column: &str,
        low: L,
        high: H,
    ) -> Self {
        let (sql, predicates) = self.where_parts();
        let predicate = between(sql, column, &low.to_sql_value(), &high.to_sql_value(), true);
        predicates.push(Connector::And, predicate);
        self
    }

    /// Adds a raw predicate joined with the given connector.
    ///
    /// **Warning**: the text is not escaped.
    #[must_use]
    fn where_raw(mut self, connector: Connector, sql: &str) -> Self {
        let (_, predicates) = self.where_parts();
        predicates.push(connector, String::from(sql));
        self
    }

    /// Opens a parenthesized group.
    #[must_use]
    fn where_open(mut self, connector: Connector) -> Self {
        let (_, predicates) = self.where_parts();
        predicates.open(connector);
        self
    }

    /// Closes the innermost parenthesized group.
    #[must_use]
    fn where_close(mut self) -> Self {
        let (_, predicates) = self.where_parts();
        predicates.close();
        self
    }
}
