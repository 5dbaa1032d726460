//! IBM DB2 dialect.

use super::{Dialect, SqlDialect};
use crate::connection::Connection;
use crate::error::Result;
use crate::lock::{LockStrategy, LockSyntax};
use crate::precompiler::{hex, Precompiler};
use crate::statement::{
    combine_suffix, push_order_by, push_where, select_core, set_clause, trace_dropped_order,
    DeleteData, DeleteRenderer, InsertRenderer, Predicates, SelectData, SelectRenderer, TableRef,
    UpdateData, UpdateRenderer,
};

/// IBM DB2 (LUW 11 and later).
#[derive(Debug, Default, Clone, Copy)]
pub struct Db2Dialect;

fn push_offset_fetch(sql: &mut String, limit: u64, offset: u64) {
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset} ROWS"));
    }
    if limit > 0 {
        sql.push_str(&format!(" FETCH FIRST {limit} ROWS ONLY"));
    }
}

impl Db2Dialect {
    /// Renders the fullselect a bounded DELETE/UPDATE operates on.
    fn fullselect(
        &self,
        table: &TableRef,
        where_clause: &Predicates,
        order_by: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<String> {
        let mut sql = format!("SELECT * FROM {}", table.render(self));
        push_where(&mut sql, where_clause)?;
        push_order_by(&mut sql, order_by);
        push_offset_fetch(&mut sql, limit, offset);
        Ok(sql)
    }
}

impl Precompiler for Db2Dialect {
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn blob_literal(&self, value: &[u8]) -> String {
        format!("BX'{}'", hex(value))
    }
}

impl SelectRenderer for Db2Dialect {
    fn dummy_table(&self) -> Option<&'static str> {
        Some("SYSIBM.SYSDUMMY1")
    }

    fn render_select(&self, data: &SelectData) -> Result<String> {
        let mut sql = select_core(self, data, "")?;
        push_offset_fetch(&mut sql, data.limit, data.offset);
        sql.push_str(&combine_suffix(self, data)?);
        Ok(sql)
    }
}

impl InsertRenderer for Db2Dialect {}

impl UpdateRenderer for Db2Dialect {
    fn render_update(&self, data: &UpdateData, _conn: Option<&mut dyn Connection>) -> Result<String> {
        let table = data.target()?;
        let set = set_clause(self, &data.set);
        if data.limit > 0 || data.offset > 0 {
            let selection = self.fullselect(
                table,
                &data.where_clause,
                &data.order_by,
                data.limit,
                data.offset,
            )?;
            return Ok(format!("UPDATE ({selection}) SET {set}"));
        }
        trace_dropped_order("UPDATE", &data.order_by);
        let mut sql = format!("UPDATE {} SET {set}", table.render(self));
        push_where(&mut sql, &data.where_clause)?;
        Ok(sql)
    }
}

impl DeleteRenderer for Db2Dialect {
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        let table = data.target()?;
        if data.limit > 0 || data.offset > 0 {
            let selection = self.fullselect(
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

impl LockStrategy for Db2Dialect {
    fn lock_syntax(&self) -> Option<LockSyntax> {
        Some(LockSyntax {
            modes: "SHARE|EXCLUSIVE",
            wait: None,
            default_modes: &["EXCLUSIVE"],
            multiple_modes: false,
        })
    }
}

impl SqlDialect for Db2Dialect {
    fn dialect(&self) -> Dialect {
        Dialect::Db2
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::Dialect;
    use crate::lock::LockBuilder;
    use crate::statement::{Delete, Select, SortOrder, Update};

    #[test]
    fn test_select_fetch_first() {
        let sql = Select::new(Dialect::Db2)
            .from("t")
            .order_by("id", SortOrder::Asc)
            .limit(10)
            .offset(20)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"t\" ORDER BY \"id\" ASC OFFSET 20 ROWS FETCH FIRST 10 ROWS ONLY"
        );
        let sql = Select::new(Dialect::Db2)
            .column_expr("CURRENT DATE", None)
            .statement(false)
            .unwrap();
        assert_eq!(sql, "SELECT CURRENT DATE FROM SYSIBM.SYSDUMMY1");
    }

    #[test]
    fn test_bounded_dml_through_fullselect() {
        let sql = Delete::new(Dialect::Db2).from("t").limit(5).statement(false).unwrap();
        assert_eq!(
            sql,
            "DELETE FROM (SELECT * FROM \"t\" FETCH FIRST 5 ROWS ONLY)"
        );

        let sql = Update::new(Dialect::Db2)
            .table("t")
            .set("a", false)
            .limit(1)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE (SELECT * FROM \"t\" FETCH FIRST 1 ROWS ONLY) SET \"a\" = 0"
        );
    }

    #[test]
    fn test_lock_ignores_nowait() {
        let lock = LockBuilder::new(Dialect::Db2)
            .unwrap()
            .add("t", &["NOWAIT", "share"]);
        assert_eq!(
            lock.commands(),
            vec![String::from("LOCK TABLE \"t\" IN SHARE MODE")]
        );
    }
}
