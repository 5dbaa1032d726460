//! SQLite dialect.

use super::{Dialect, SqlDialect};
use crate::connection::Connection;
use crate::error::Result;
use crate::lock::{LockStrategy, LockSyntax};
use crate::precompiler::Precompiler;
use crate::statement::{
    combine_suffix, push_order_by, push_where, select_core, update_head, DeleteData,
    DeleteRenderer, InsertRenderer, Predicates, SelectData, SelectRenderer, TableRef, UpdateData,
    UpdateRenderer,
};
use crate::value::TIMESTAMP_FORMAT;

/// SQLite. Bounded DELETE/UPDATE go through `rowid`, since the ORDER BY/LIMIT
/// extension on those statements is a compile-time option.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

/// SQLite spells "no limit" as `LIMIT -1`.
fn push_limit(sql: &mut String, limit: u64, offset: u64) {
    if limit > 0 {
        sql.push_str(&format!(" LIMIT {limit}"));
    } else if offset > 0 {
        sql.push_str(" LIMIT -1");
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
}

impl SqliteDialect {
    fn rowid_subquery(
        &self,
        table: &TableRef,
        where_clause: &Predicates,
        order_by: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<String> {
        let mut sql = format!("SELECT rowid FROM {}", table.render(self));
        push_where(&mut sql, where_clause)?;
        push_order_by(&mut sql, order_by);
        push_limit(&mut sql, limit, offset);
        Ok(format!("rowid IN ({sql})"))
    }
}

impl Precompiler for SqliteDialect {
    fn timestamp_literal(&self, value: &chrono::NaiveDateTime) -> String {
        self.string_literal(&value.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl SelectRenderer for SqliteDialect {
    fn render_select(&self, data: &SelectData) -> Result<String> {
        let mut sql = select_core(self, data, "")?;
        push_limit(&mut sql, data.limit, data.offset);
        sql.push_str(&combine_suffix(self, data)?);
        Ok(sql)
    }
}

impl InsertRenderer for SqliteDialect {}

impl UpdateRenderer for SqliteDialect {
    fn render_update(&self, data: &UpdateData, _conn: Option<&mut dyn Connection>) -> Result<String> {
        let mut sql = update_head(self, data)?;
        if data.is_bounded() {
            let table = data.target()?;
            sql.push_str(" WHERE ");
            sql.push_str(&self.rowid_subquery(
                table,
                &data.where_clause,
                &data.order_by,
                data.limit,
                data.offset,
            )?);
        } else {
            push_where(&mut sql, &data.where_clause)?;
        }
        Ok(sql)
    }
}

impl DeleteRenderer for SqliteDialect {
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        let table = data.target()?;
        let mut sql = format!("DELETE FROM {}", table.render(self));
        if data.is_bounded() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.rowid_subquery(
                table,
                &data.where_clause,
                &data.order_by,
                data.limit,
                data.offset,
            )?);
        } else {
            push_where(&mut sql, &data.where_clause)?;
        }
        Ok(sql)
    }
}

impl LockStrategy for SqliteDialect {
    fn lock_syntax(&self) -> Option<LockSyntax> {
        None
    }
}

impl SqlDialect for SqliteDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}
