//! Microsoft SQL Server dialect.
//!
//! T-SQL has no LIMIT/OFFSET on DELETE or UPDATE. Bounded statements select the
//! target rows in a CTE (`TOP n`, or `OFFSET ... FETCH` when an offset is set)
//! and run the DML against the CTE, which SQL Server resolves to the base table.

use tracing::debug;

use super::{Dialect, SqlDialect};
use crate::command::Command;
use crate::connection::Connection;
use crate::error::{DbalError, Result};
use crate::lock::{LockStrategy, LockSyntax};
use crate::precompiler::{hex, Precompiler};
use crate::reader::DataReader;
use crate::statement::{
    combine_suffix, push_order_by, push_where, select_core, set_clause, trace_dropped_order,
    DeleteData, DeleteRenderer, InsertRenderer, Predicates, SelectData, SelectRenderer, TableRef,
    UpdateData, UpdateRenderer,
};

/// Microsoft SQL Server.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsSqlDialect;

/// Appends `OFFSET m ROWS [FETCH NEXT n ROWS ONLY]`, ordering by a constant
/// when the statement has no ORDER BY of its own.
fn push_offset_fetch(sql: &mut String, order_by: &[String], limit: u64, offset: u64) {
    if order_by.is_empty() {
        sql.push_str(" ORDER BY (SELECT NULL)");
    }
    sql.push_str(&format!(" OFFSET {offset} ROWS"));
    if limit > 0 {
        sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
    }
}

fn unquoted(segment: &str) -> &str {
    segment.trim_matches(|c| matches!(c, '[' | ']' | '"' | '`'))
}

/// Picks a CTE name that cannot collide with the source table or its alias.
fn cte_alias(table: &TableRef) -> &'static str {
    let is_t0 = |name: &str| unquoted(name).eq_ignore_ascii_case("t0");
    let table_name = table.name.rsplit('.').next().unwrap_or(&table.name);
    if is_t0(table_name) || table.alias.as_deref().is_some_and(is_t0) {
        "t1"
    } else {
        "t0"
    }
}

impl MsSqlDialect {
    /// Renders `WITH <alias> AS (SELECT ... )` selecting the rows a bounded
    /// DELETE/UPDATE touches, and returns the alias with it.
    fn bounded_cte(
        &self,
        table: &TableRef,
        where_clause: &Predicates,
        order_by: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<(&'static str, String)> {
        let alias = cte_alias(table);
        let mut sql = String::from("SELECT ");
        if offset == 0 {
            sql.push_str(&format!("TOP {limit} "));
        }
        sql.push_str("* FROM ");
        sql.push_str(&table.render(self));
        push_where(&mut sql, where_clause)?;
        push_order_by(&mut sql, order_by);
        if offset > 0 {
            push_offset_fetch(&mut sql, order_by, limit, offset);
        }
        Ok((alias, format!("WITH {alias} AS ({sql})")))
    }

    /// Returns the identity columns of `table`.
    fn identity_columns(&self, conn: &mut dyn Connection, table: &TableRef) -> Result<Vec<String>> {
        let mut segments = table.name.rsplit('.').map(unquoted);
        let name = segments.next().unwrap_or_default();
        let mut sql = format!(
            "SELECT [COLUMN_NAME] FROM [INFORMATION_SCHEMA].[COLUMNS] WHERE [TABLE_NAME] = {}",
            self.string_literal(name)
        );
        if let Some(schema) = segments.next() {
            sql.push_str(&format!(" AND [TABLE_SCHEMA] = {}", self.string_literal(schema)));
        }
        sql.push_str(
            " AND COLUMNPROPERTY(OBJECT_ID(QUOTENAME([TABLE_SCHEMA]) + '.' + QUOTENAME([TABLE_NAME])), \
             [COLUMN_NAME], 'IsIdentity') = 1",
        );

        let mut reader = DataReader::new(conn, Command::new(sql))?;
        let mut columns = Vec::new();
        while reader.read()? {
            if let Some(record) = reader.record() {
                columns.push(record.get_as::<String>("COLUMN_NAME")?);
            }
        }
        Ok(columns)
    }
}

impl Precompiler for MsSqlDialect {
    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn blob_literal(&self, value: &[u8]) -> String {
        format!("0x{}", hex(value))
    }

    /// ISO 8601 with `T`; SQL Server reads it the same under every
    /// `DATEFORMAT` and language setting.
    fn timestamp_literal(&self, value: &chrono::NaiveDateTime) -> String {
        format!("'{}'", value.format("%Y-%m-%dT%H:%M:%S"))
    }
}

impl SelectRenderer for MsSqlDialect {
    fn render_select(&self, data: &SelectData) -> Result<String> {
        let mut sql = if data.offset > 0 {
            let mut sql = select_core(self, data, "")?;
            push_offset_fetch(&mut sql, &data.order_by, data.limit, data.offset);
            sql
        } else if data.limit > 0 {
            select_core(self, data, &format!("TOP {} ", data.limit))?
        } else {
            select_core(self, data, "")?
        };
        sql.push_str(&combine_suffix(self, data)?);
        Ok(sql)
    }
}

impl InsertRenderer for MsSqlDialect {}

impl UpdateRenderer for MsSqlDialect {
    fn render_update(&self, data: &UpdateData, conn: Option<&mut dyn Connection>) -> Result<String> {
        let table = data.target()?;

        let mut set = data.set.clone();
        if let Some(conn) = conn {
            let identity = self.identity_columns(conn, table)?;
            set.retain(|(column, _)| {
                let name = unquoted(column.rsplit('.').next().unwrap_or(column));
                let keep = !identity.iter().any(|i| i.eq_ignore_ascii_case(name));
                if !keep {
                    debug!(column = %column, "Skipping identity column in UPDATE");
                }
                keep
            });
            if set.is_empty() {
                return Err(DbalError::InvalidArgument(String::from(
                    "UPDATE assigns only identity columns",
                )));
            }
        }

        if data.limit > 0 || data.offset > 0 {
            let (alias, cte) = self.bounded_cte(
                table,
                &data.where_clause,
                &data.order_by,
                data.limit,
                data.offset,
            )?;
            return Ok(format!("{cte} UPDATE {alias} SET {}", set_clause(self, &set)));
        }

        trace_dropped_order("UPDATE", &data.order_by);
        let mut sql = format!("UPDATE {} SET {}", table.render(self), set_clause(self, &set));
        push_where(&mut sql, &data.where_clause)?;
        Ok(sql)
    }
}

impl DeleteRenderer for MsSqlDialect {
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        let table = data.target()?;
        if data.limit > 0 || data.offset > 0 {
            let (alias, cte) = self.bounded_cte(
                table,
                &data.where_clause,
                &data.order_by,
                data.limit,
                data.offset,
            )?;
            return Ok(format!("{cte} DELETE FROM {alias}"));
        }
        trace_dropped_order("DELETE", &data.order_by);
        let mut sql = format!("DELETE FROM {}", table.render(self));
        push_where(&mut sql, &data.where_clause)?;
        Ok(sql)
    }
}

impl LockStrategy for MsSqlDialect {
    fn lock_syntax(&self) -> Option<LockSyntax> {
        Some(LockSyntax {
            modes: "TABLOCK|TABLOCKX|HOLDLOCK|UPDLOCK|XLOCK|PAGLOCK|ROWLOCK|SERIALIZABLE|\
                    REPEATABLEREAD|READCOMMITTED|READCOMMITTEDLOCK|READUNCOMMITTED|READPAST|NOLOCK",
            wait: Some("NOWAIT"),
            default_modes: &["TABLOCKX", "HOLDLOCK"],
            multiple_modes: true,
        })
    }

    fn lock_clause(&self, table: &str, modes: &[String], wait: Option<&str>) -> String {
        let mut hints: Vec<&str> = modes.iter().map(String::as_str).collect();
        hints.extend(wait);
        format!("SELECT * FROM {table} WITH ({})", hints.join(", "))
    }
}

impl SqlDialect for MsSqlDialect {
    fn dialect(&self) -> Dialect {
        Dialect::MsSql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::LockBuilder;
    use crate::mock::MockConnection;
    use crate::reader::Record;
    use crate::statement::{Delete, Filter, Operator, Select, SortOrder, Update};
    use crate::value::SqlValue;

    #[test]
    fn test_update_with_limit_over_t0_uses_t1() {
        let sql = Update::new(Dialect::MsSql)
            .table("t0")
            .set("a", 1)
            .where_clause("b", Operator::Eq, 2)
            .limit(5)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "WITH t1 AS (SELECT TOP 5 * FROM [t0] WHERE [b] = 2) UPDATE t1 SET [a] = 1"
        );
    }

    #[test]
    fn test_cte_alias_avoids_source_alias() {
        let sql = Delete::new(Dialect::MsSql)
            .from_as("orders", "t0")
            .limit(1)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "WITH t1 AS (SELECT TOP 1 * FROM [orders] AS [t0]) DELETE FROM t1"
        );

        let sql = Delete::new(Dialect::MsSql)
            .from("orders")
            .order_by("id", SortOrder::Asc)
            .limit(3)
            .statement(true)
            .unwrap();
        assert_eq!(
            sql,
            "WITH t0 AS (SELECT TOP 3 * FROM [orders] ORDER BY [id] ASC) DELETE FROM t0;"
        );
    }

    #[test]
    fn test_cte_with_offset_uses_offset_fetch() {
        let sql = Delete::new(Dialect::MsSql)
            .from("orders")
            .limit(10)
            .offset(20)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "WITH t0 AS (SELECT * FROM [orders] ORDER BY (SELECT NULL) OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY) DELETE FROM t0"
        );
    }

    #[test]
    fn test_order_by_alone_is_dropped_from_dml() {
        let sql = Delete::new(Dialect::MsSql)
            .from("orders")
            .order_by("id", SortOrder::Asc)
            .statement(false)
            .unwrap();
        assert_eq!(sql, "DELETE FROM [orders]");
    }

    #[test]
    fn test_select_top_and_offset_fetch() {
        let sql = Select::new(Dialect::MsSql)
            .distinct(true)
            .from("t")
            .limit(5)
            .statement(false)
            .unwrap();
        assert_eq!(sql, "SELECT DISTINCT TOP 5 * FROM [t]");

        let sql = Select::new(Dialect::MsSql)
            .from("t")
            .order_by("id", SortOrder::Asc)
            .limit(5)
            .offset(10)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM [t] ORDER BY [id] ASC OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_identity_columns_are_excluded_from_set() {
        let update = Update::new(Dialect::MsSql)
            .table("dbo.users")
            .set("id", 9)
            .set("name", "x")
            .limit(1);
        let probe = update_probe_sql();
        let mut identity = Record::new();
        identity.push("COLUMN_NAME", SqlValue::Text(String::from("id")));
        let mut conn = MockConnection::new(Dialect::MsSql).with_result(&probe, vec![identity]);

        let command = update.command_on(&mut conn).unwrap();
        assert_eq!(
            command.text(),
            "WITH t0 AS (SELECT TOP 1 * FROM [dbo].[users]) UPDATE t0 SET [name] = 'x'"
        );
        assert_eq!(conn.log(), &[probe]);

        // Without a connection the probe is skipped.
        assert!(update.statement(false).unwrap().contains("[id] = 9"));
    }

    fn update_probe_sql() -> String {
        String::from(
            "SELECT [COLUMN_NAME] FROM [INFORMATION_SCHEMA].[COLUMNS] WHERE [TABLE_NAME] = 'users' \
             AND [TABLE_SCHEMA] = 'dbo' AND COLUMNPROPERTY(OBJECT_ID(QUOTENAME([TABLE_SCHEMA]) + '.' \
             + QUOTENAME([TABLE_NAME])), [COLUMN_NAME], 'IsIdentity') = 1",
        )
    }

    #[test]
    fn test_lock_hints() {
        let lock = LockBuilder::new(Dialect::MsSql)
            .unwrap()
            .add("a", &["NOWAIT"])
            .add("b", &["updlock", "rowlock", "junk"]);
        assert_eq!(
            lock.commands(),
            vec![
                String::from("SELECT * FROM [a] WITH (TABLOCKX, HOLDLOCK, NOWAIT)"),
                String::from("SELECT * FROM [b] WITH (UPDLOCK, ROWLOCK)"),
            ]
        );
    }
}
