//! Firebird dialect.

use super::{Dialect, SqlDialect};
use crate::connection::Connection;
use crate::error::Result;
use crate::lock::{LockStrategy, LockSyntax};
use crate::precompiler::Precompiler;
use crate::statement::{
    combine_suffix, push_order_by, push_where, select_core, update_head, DeleteData,
    DeleteRenderer, InsertRenderer, SelectData, SelectRenderer, UpdateData, UpdateRenderer,
};

/// Upper row bound used when only an offset is set.
const LAST_ROW: u64 = 9_223_372_036_854_775_807;

/// Firebird 3 and later.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirebirdDialect;

/// Appends `ROWS n` or `ROWS m TO n` (1-based, inclusive).
fn push_rows(sql: &mut String, limit: u64, offset: u64) {
    match (limit, offset) {
        (0, 0) => {}
        (limit, 0) => sql.push_str(&format!(" ROWS {limit}")),
        (0, offset) => sql.push_str(&format!(" ROWS {} TO {LAST_ROW}", offset.saturating_add(1))),
        (limit, offset) => sql.push_str(&format!(
            " ROWS {} TO {}",
            offset.saturating_add(1),
            offset.saturating_add(limit)
        )),
    }
}

impl Precompiler for FirebirdDialect {}

impl SelectRenderer for FirebirdDialect {
    fn dummy_table(&self) -> Option<&'static str> {
        Some("RDB$DATABASE")
    }

    fn render_select(&self, data: &SelectData) -> Result<String> {
        if data.limit == 0 && data.offset == 0 {
            let mut sql = select_core(self, data, "")?;
            sql.push_str(&combine_suffix(self, data)?);
            return Ok(sql);
        }

        // FIRST/SKIP precede DISTINCT in Firebird.
        let mut head = String::new();
        if data.limit > 0 {
            head.push_str(&format!("FIRST {} ", data.limit));
        }
        if data.offset > 0 {
            head.push_str(&format!("SKIP {} ", data.offset));
        }
        if data.distinct {
            head.push_str("DISTINCT ");
        }
        let plain = SelectData {
            distinct: false,
            ..data.clone()
        };
        let mut sql = select_core(self, &plain, &head)?;
        sql.push_str(&combine_suffix(self, data)?);
        Ok(sql)
    }
}

impl InsertRenderer for FirebirdDialect {}

impl UpdateRenderer for FirebirdDialect {
    fn render_update(&self, data: &UpdateData, _conn: Option<&mut dyn Connection>) -> Result<String> {
        let mut sql = update_head(self, data)?;
        push_where(&mut sql, &data.where_clause)?;
        push_order_by(&mut sql, &data.order_by);
        push_rows(&mut sql, data.limit, data.offset);
        Ok(sql)
    }
}

impl DeleteRenderer for FirebirdDialect {
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", data.target()?.render(self));
        push_where(&mut sql, &data.where_clause)?;
        push_order_by(&mut sql, &data.order_by);
        push_rows(&mut sql, data.limit, data.offset);
        Ok(sql)
    }
}

impl LockStrategy for FirebirdDialect {
    fn lock_syntax(&self) -> Option<LockSyntax> {
        Some(LockSyntax {
            modes: "FOR UPDATE",
            wait: None,
            default_modes: &[],
            multiple_modes: false,
        })
    }

    fn lock_clause(&self, table: &str, modes: &[String], _wait: Option<&str>) -> String {
        let mut sql = format!("SELECT * FROM {table}");
        for mode in modes {
            sql.push(' ');
            sql.push_str(mode);
        }
        sql.push_str(" WITH LOCK");
        sql
    }
}

impl SqlDialect for FirebirdDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Firebird
    }
}
