//! ANSI SQL dialect.

use super::{Dialect, SqlDialect};
use crate::lock::LockStrategy;
use crate::precompiler::Precompiler;
use crate::statement::{DeleteRenderer, InsertRenderer, SelectRenderer, UpdateRenderer};

/// ANSI SQL: double-quoted identifiers, `TRUE`/`FALSE`, `LIMIT`/`OFFSET`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDialect;

impl Precompiler for StandardDialect {}
impl SelectRenderer for StandardDialect {}
impl InsertRenderer for StandardDialect {}
impl UpdateRenderer for StandardDialect {}
impl DeleteRenderer for StandardDialect {}
impl LockStrategy for StandardDialect {}

impl SqlDialect for StandardDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Standard
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::Dialect;
    use crate::statement::{Delete, Filter, Operator, Select, SortOrder};

    #[test]
    fn test_minimal_forms() {
        let sql = Select::new(Dialect::Standard).column("a").statement(true).unwrap();
        assert_eq!(sql, "SELECT \"a\";");
        let sql = Delete::new(Dialect::Standard).from("t").statement(true).unwrap();
        assert_eq!(sql, "DELETE FROM \"t\";");
    }

    #[test]
    fn test_offset_only_select() {
        let sql = Select::new(Dialect::Standard)
            .from("t")
            .where_clause("a", Operator::Like, "x%")
            .order_by("a", SortOrder::Asc)
            .offset(20)
            .statement(false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"t\" WHERE \"a\" LIKE 'x%' ORDER BY \"a\" ASC OFFSET 20"
        );
    }
}
