//! PostgreSQL dialect.
//!
//! PostgreSQL rejects ORDER BY/LIMIT/OFFSET on DELETE and UPDATE, so bounded
//! statements select the physical row ids (`ctid`) of the affected rows in a
//! subquery instead.

use super::{Dialect, SqlDialect};
use crate::connection::Connection;
use crate::error::Result;
use crate::lock::LockStrategy;
use crate::precompiler::{hex, Precompiler};
use crate::statement::{
    push_limit_offset, push_order_by, push_where, update_head, DeleteData, DeleteRenderer,
    InsertRenderer, Predicates, SelectRenderer, TableRef, UpdateData, UpdateRenderer,
};

/// PostgreSQL.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Renders `ctid = any(array(SELECT ctid FROM ...))` for a bounded statement.
    fn ctid_subquery(
        &self,
        table: &TableRef,
        where_clause: &Predicates,
        order_by: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<String> {
        let mut sql = format!("SELECT ctid FROM {}", table.render(self));
        push_where(&mut sql, where_clause)?;
        push_order_by(&mut sql, order_by);
        push_limit_offset(&mut sql, limit, offset);
        Ok(format!("ctid = any(array({sql}))"))
    }
}

impl Precompiler for PostgresDialect {
    fn blob_literal(&self, value: &[u8]) -> String {
        format!("'\\x{}'::bytea", hex(value))
    }
}

impl SelectRenderer for PostgresDialect {}
impl InsertRenderer for PostgresDialect {}

impl UpdateRenderer for PostgresDialect {
    fn render_update(&self, data: &UpdateData, _conn: Option<&mut dyn Connection>) -> Result<String> {
        let mut sql = update_head(self, data)?;
        if data.is_bounded() {
            let table = data.target()?;
            sql.push_str(" WHERE ");
            sql.push_str(&self.ctid_subquery(
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

impl DeleteRenderer for PostgresDialect {
    fn render_delete(&self, data: &DeleteData) -> Result<String> {
        let table = data.target()?;
        let mut sql = format!("DELETE FROM {}", table.render(self));
        if data.is_bounded() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.ctid_subquery(
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

impl LockStrategy for PostgresDialect {}

impl SqlDialect for PostgresDialect {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }
}
