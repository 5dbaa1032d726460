//! Oracle dialect.
//!
//! Oracle has no LIMIT/OFFSET; row windows are expressed with `ROWNUM` over a
//! nested SELECT. The offset is treated as the 1-based number of the first row
//! kept, so a window of `limit` rows spans `offset ..= offset + limit - 1`.

use super::{Dialect, SqlDialect};
use crate::connection::Connection;
use crate::error::Result;
use crate::lock::{LockStrategy, LockSyntax};
use crate::precompiler::{hex, Precompiler};
use crate::statement::{
    combine_suffix, push_order_by, push_where, quoted_columns, select_core, trace_dropped_order,
    update_head, DeleteData, DeleteRenderer, InsertData, InsertRenderer, Predicates, SelectData,
    SelectRenderer, TableRef, UpdateData, UpdateRenderer,
};
use crate::value::TIMESTAMP_FORMAT;

/// Oracle.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDialect;

impl OracleDialect {
    /// Wraps `sql` in a ROWNUM window.
    fn rownum_window(&self, sql: String, limit: u64, offset: u64) -> String {
        match (limit, offset) {
            (0, 0) => sql,
            (limit, 0) => format!("SELECT * FROM ({sql}) WHERE ROWNUM <= {limit}"),
            (0, offset) => format!("SELECT * FROM ({sql}) WHERE ROWNUM >= {offset}"),
            (limit, offset) => {
                let max = offset.saturating_add(limit) - 1;
                let t0 = self.prepare_alias("t0");
                let rn = self.prepare_alias("rn");
                format!(
                    "SELECT * FROM (SELECT {t0}.*, ROWNUM AS {rn} FROM ({sql}) {t0} \
                     WHERE ROWNUM <= {max}) WHERE {rn} >= {offset}"
                )
            }
        }
    }

    /// Renders the windowed selection of the rows a bounded DML touches.
    fn bounded_selection(
        &self,
        columns: &str,
        table: &TableRef,
        where_clause: &Predicates,
        order_by: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<String> {
        let mut sql = format!("SELECT {columns} FROM {}", table.render(self));
        push_where(&mut sql, where_clause)?;
        push_order_by(&mut sql, order_by);
        Ok(self.rownum_window(sql, limit, offset))
    }
}

impl Precompiler for OracleDialect {
    fn table_alias_keyword(&self) -> &'static str {
        " "
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn blob_literal(&self, value: &[u8]) -> String {
        format!("HEXTORAW('{}')", hex(value))
    }

    fn timestamp_literal(&self, value: &chrono::NaiveDateTime) -> String {
        format!(
            "TO_TIMESTAMP('{}', 'YYYY-MM-DD HH24:MI:SS')",
            value.format(TIMESTAMP_FORMAT)
        )
    }
}

impl SelectRenderer for OracleDialect {
    fn dummy_table(&self) -> Option<&'static str> {
        Some("dual")
    }

    fn render_select(&self, data: &SelectData) -> Result<String> {
        let sql = select_core(self, data, "")?;
        let mut sql = self.rownum_window(sql, data.limit, data.offset);
        sql.push_str(&combine_suffix(self, data)?);
        Ok(sql)
    }
}

impl InsertRenderer for OracleDialect {
    fn render_insert(&self, data: &InsertData) -> Result<String> {
        let into = data.target()?.render(self);
        let columns = quoted_columns(self, data);
        let rows = data.aligned_rows();
        if rows.len() == 1 {
            return Ok(format!(
                "INSERT INTO {into} ({columns}) VALUES ({})",
                rows[0].join(", ")
            ));
        }
        let mut sql = String::from("INSERT ALL");
        for values in rows {
            sql.push_str(&format!(" INTO {into} ({columns}) VALUES ({})", values.join(", ")));
        }
        sql.push_str(" SELECT * FROM dual");
        Ok(sql)
    }
}

impl UpdateRenderer for OracleDialect {
    fn render_update(&self, data: &UpdateData, _conn: Option<&mut dyn Connection>) -> Result<String> {
        let mut sql = update_head(self, data)?;
        if data.limit > 0 || data.offset > 0 {
            let rid = self.prepare_alias("rid");
            let selection = self.bounded_selection(
                &format!("ROWID AS {rid}"),
                data.target()?,
                &data.where_clause,
                &data.order_by,
                data.limit,
                data.offset,
            )?;
            sql.push_str(&format!(" WHERE ROWID IN (SELECT {rid} FROM ({selection}))"));
        } else {
            trace_dropped_order("UPDATE", &data.order_by);
            push_where(&mut sql, &data.where_clause)?;
        }
        Ok(sql)
    }
}

impl DeleteRenderer for OracleDialect {
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        let table = data.target()?;
        if data.limit > 0 || data.offset > 0 {
            let selection = self.bounded_selection(
                "*",
                table,
                &data.where_clause,
                &data.order_by,
                data.limit,
                data.offset,
            )?;
            return Ok(format!("DELETE FROM ({selection})"));
        }
        trace_dropped_order("DELETE", &data.order_by);
        let mut sql = format!("DELETE FROM {}", table.render(self));
        push_where(&mut sql, &data.where_clause)?;
        Ok(sql)
    }
}

impl LockStrategy for OracleDialect {
    fn lock_syntax(&self) -> Option<LockSyntax> {
        Some(LockSyntax {
            modes: "ROW SHARE|ROW EXCLUSIVE|SHARE UPDATE|SHARE|SHARE ROW EXCLUSIVE|EXCLUSIVE",
            wait: Some(r"NOWAIT|WAIT \d+"),
            default_modes: &["EXCLUSIVE"],
            multiple_modes: false,
        })
    }
}

impl SqlDialect for OracleDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::Dialect;
    use crate::lock::LockBuilder;
    use crate::statement::{Delete, Filter, Insert, Operator, Select, SortOrder, Update};

    #[test]
    fn test_bounded_delete_windows_with_rownum() {
        let sql = Delete::new(Dialect::Oracle)
            .from("t")
            .where_clause("a", Operator::Eq, 1)
            .order_by("id", SortOrder::Asc)
            .limit(10)
            .offset(5)
            .statement(true)
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM (SELECT * FROM (SELECT \"t0\".*, ROWNUM AS \"rn\" FROM \
             (SELECT * FROM \"t\" WHERE \"a\" = 1 ORDER BY \"id\" ASC) \"t0\" WHERE ROWNUM <= 14) \
             WHERE \"rn\" >= 5);"
        );
    }

    #[test]
    fn test_single_sided_windows() {
        let sql = Delete::new(Dialect::Oracle).from("t").limit(3).statement(false).unwrap();
        assert_eq!(
            sql,
            "DELETE FROM (SELECT * FROM (SELECT * FROM \"t\") WHERE ROWNUM <= 3)"
        );

        let sql = Select::new(Dialect::Oracle).from("t").offset(4).statement(false).unwrap();
        assert_eq!(sql, "SELECT * FROM (SELECT * FROM \"t\") WHERE ROWNUM >= 4");
    }

    #[test]
    fn test_bounded_update_through_rowid() {
        let sql = Update::new(Dialect::Oracle)
            .table("t")
            .set("flag", true)
            .limit(2)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"t\" SET \"flag\" = 1 WHERE ROWID IN (SELECT \"rid\" FROM \
             (SELECT * FROM (SELECT ROWID AS \"rid\" FROM \"t\") WHERE ROWNUM <= 2))"
        );
    }

    #[test]
    fn test_select_without_table_uses_dual() {
        let sql = Select::new(Dialect::Oracle)
            .column_expr("SYSDATE", Some("now"))
            .statement(false)
            .unwrap();
        assert_eq!(sql, "SELECT SYSDATE AS \"now\" FROM dual");
    }

    #[test]
    fn test_table_alias_without_as() {
        let sql = Select::new(Dialect::Oracle)
            .from_as("users", "u")
            .statement(false)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"users\" \"u\"");
    }

    #[test]
    fn test_multi_row_insert_all() {
        let sql = Insert::new(Dialect::Oracle)
            .into_table("t")
            .value("a", 1)
            .next_row()
            .value("a", 2)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "INSERT ALL INTO \"t\" (\"a\") VALUES (1) INTO \"t\" (\"a\") VALUES (2) SELECT * FROM dual"
        );
    }

    #[test]
    fn test_lock_wait_modifier() {
        let lock = LockBuilder::new(Dialect::Oracle)
            .unwrap()
            .add("t", &["share", "WAIT 10"]);
        assert_eq!(
            lock.commands(),
            vec![String::from("LOCK TABLE \"t\" IN SHARE MODE WAIT 10")]
        );
    }
}
