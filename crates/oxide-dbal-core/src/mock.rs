//! A deterministic in-memory connection for tests.
//!
//! Results are looked up by the exact SQL text of the command. Unknown queries
//! return no rows. Every statement and transaction call is recorded in order so
//! tests can assert on what would have reached the database.

use std::any::Any;
use std::collections::HashMap;

use tracing::debug;

use crate::command::Command;
use crate::config::DataSource;
use crate::connection::{BufferedResult, Connection, NativeResult};
use crate::dialect::Dialect;
use crate::error::{DbalError, Result};
use crate::reader::Record;

/// A connection that never talks to a database.
#[derive(Debug, Clone, Default)]
pub struct MockConnection {
    data_source: DataSource,
    results: HashMap<String, Vec<Record>>,
    affected: HashMap<String, u64>,
    failures: HashMap<String, String>,
    log: Vec<String>,
    in_transaction: bool,
}

impl MockConnection {
    /// Creates a mock connection for a dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self::from_data_source(DataSource::new("mock", dialect))
    }

    /// Creates a mock connection whose results come from the data source's
    /// `results` map.
    #[must_use]
    pub fn from_data_source(data_source: DataSource) -> Self {
        let results = data_source
            .results
            .keys()
            .filter_map(|sql| data_source.result_rows(sql).map(|rows| (sql.clone(), rows)))
            .collect();
        Self {
            data_source,
            results,
            ..Self::default()
        }
    }

    /// Registers the rows returned for `sql`.
    #[must_use]
    pub fn with_result(mut self, sql: &str, rows: Vec<Record>) -> Self {
        self.results.insert(String::from(sql), rows);
        self
    }

    /// Registers the affected-row count `execute` reports for `sql`.
    #[must_use]
    pub fn with_affected(mut self, sql: &str, rows: u64) -> Self {
        self.affected.insert(String::from(sql), rows);
        self
    }

    /// Makes `sql` fail with a `Query` error carrying `message`.
    #[must_use]
    pub fn fail_on(mut self, sql: &str, message: &str) -> Self {
        self.failures.insert(String::from(sql), String::from(message));
        self
    }

    /// Returns every statement received, in order. Transaction calls appear as
    /// `BEGIN`, `COMMIT` and `ROLLBACK`.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Clears the statement log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Returns true while a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn record(&mut self, sql: String) -> Result<String> {
        debug!(sql = %sql, "Mock statement");
        self.log.push(sql.clone());
        match self.failures.get(&sql) {
            Some(message) => Err(DbalError::query(message.clone())),
            None => Ok(sql),
        }
    }
}

impl Connection for MockConnection {
    fn data_source(&self) -> &DataSource {
        &self.data_source
    }

    /// The mock has no driver underneath; it is its own native handle.
    fn get_resource(&mut self) -> &mut dyn Any {
        self
    }

    fn execute(&mut self, command: Command) -> Result<u64> {
        let sql = self.record(command.to_string())?;
        Ok(self.affected.get(&sql).copied().unwrap_or(0))
    }

    fn query(&mut self, command: Command) -> Result<Box<dyn NativeResult>> {
        let sql = self.record(command.to_string())?;
        let rows = self.results.get(&sql).cloned().unwrap_or_default();
        Ok(Box::new(BufferedResult::new(rows)))
    }

    fn begin_transaction(&mut self) -> Result<()> {
        self.record(String::from("BEGIN"))?;
        if self.in_transaction {
            return Err(DbalError::query("a transaction is already active"));
        }
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.record(String::from("COMMIT"))?;
        if !self.in_transaction {
            return Err(DbalError::query("no active transaction"));
        }
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.record(String::from("ROLLBACK"))?;
        if !self.in_transaction {
            return Err(DbalError::query("no active transaction"));
        }
        self.in_transaction = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DataReader;
    use crate::value::SqlValue;

    #[test]
    fn test_results_by_exact_text() {
        let mut row = Record::new();
        row.push("n", SqlValue::Int(1));
        let mut conn = MockConnection::new(Dialect::Standard).with_result("SELECT 1", vec![row]);

        let mut reader = DataReader::new(&mut conn, Command::new("SELECT 1")).unwrap();
        assert!(reader.read().unwrap());
        assert!(!reader.read().unwrap());

        let mut reader = DataReader::new(&mut conn, Command::new("SELECT 2")).unwrap();
        assert!(!reader.read().unwrap());
        assert_eq!(conn.log(), &["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_scripted_failure_carries_message() {
        let mut conn = MockConnection::new(Dialect::Standard).fail_on("BOOM", "syntax error");
        let err = conn.execute(Command::new("BOOM")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to execute SQL statement. Reason: syntax error"
        );
        assert!(DataReader::new(&mut conn, Command::new("BOOM")).is_err());
    }

    #[test]
    fn test_transaction_state() {
        let mut conn = MockConnection::new(Dialect::Standard);
        conn.begin_transaction().unwrap();
        assert!(conn.in_transaction());
        assert!(conn.begin_transaction().is_err());
        conn.rollback().unwrap();
        assert!(conn.commit().is_err());
        assert_eq!(conn.log(), &["BEGIN", "BEGIN", "ROLLBACK", "COMMIT"]);
    }

    #[test]
    fn test_results_from_data_source() {
        let mut source = DataSource::new("fixtures", Dialect::PostgreSql);
        let row = serde_json::json!({"id": 7});
        source.results.insert(
            String::from("SELECT \"id\" FROM \"t\""),
            vec![row.as_object().unwrap().clone()],
        );
        let mut conn = MockConnection::from_data_source(source);
        assert_eq!(conn.dialect(), Dialect::PostgreSql);

        let records = DataReader::new(&mut conn, Command::new("SELECT \"id\" FROM \"t\""))
            .unwrap()
            .collect_records()
            .unwrap();
        assert_eq!(records[0].get_as::<i64>("id").unwrap(), 7);
    }

    #[test]
    fn test_resource_through_dyn_connection() {
        let mut mock = MockConnection::new(Dialect::MySql).with_affected("DELETE FROM t", 4);
        let conn: &mut dyn Connection = &mut mock;

        assert!(conn.resource_as::<String>().is_none());
        let native = conn.resource_as::<MockConnection>().unwrap();
        native.clear_log();
        assert_eq!(native.execute(Command::new("DELETE FROM t")).unwrap(), 4);
        assert_eq!(mock.log(), &["DELETE FROM t"]);
    }
}
