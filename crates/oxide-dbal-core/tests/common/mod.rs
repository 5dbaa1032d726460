#![allow(dead_code)]

use oxide_dbal_core::dialect::Dialect;
use oxide_dbal_core::mock::MockConnection;
use oxide_dbal_core::reader::Record;
use oxide_dbal_core::value::SqlValue;

/// Builds a record from integer columns.
pub fn int_record(pairs: &[(&str, i64)]) -> Record {
    pairs
        .iter()
        .map(|(column, value)| (String::from(*column), SqlValue::Int(*value)))
        .collect()
}

/// Returns `n` single-column rows numbered from 1.
pub fn numbered(n: i64) -> Vec<Record> {
    (1..=n).map(|id| int_record(&[("id", id)])).collect()
}

/// A mock connection answering `sql` with `rows`.
pub fn mock_with(dialect: Dialect, sql: &str, rows: Vec<Record>) -> MockConnection {
    MockConnection::new(dialect).with_result(sql, rows)
}

/// Asserts that a rendered WHERE clause never has a connector right after `(`
/// or right before `)`.
pub fn assert_balanced_connectors(sql: &str) {
    for connector in ["AND", "OR"] {
        assert!(
            !sql.contains(&format!("( {connector} ")) && !sql.contains(&format!("({connector} ")),
            "connector after '(' in: {sql}"
        );
        assert!(
            !sql.contains(&format!(" {connector} )")) && !sql.contains(&format!(" {connector})")),
            "connector before ')' in: {sql}"
        );
    }
}
