//! Data readers: a pull cursor over one native result handle.
//!
//! A [`DataReader`] issues its query on construction and then exposes
//! `read()`/`record()`. The native handle is released by `dispose()`, which is
//! idempotent, and by `Drop`, so a reader can never leak its result set on an
//! early return.

use std::marker::PhantomData;

use tracing::debug;

use crate::command::Command;
use crate::connection::{Connection, NativeResult};
use crate::error::{DbalError, Result};
use crate::value::{FromSqlValue, SqlValue};

/// One row: column names mapped to values, in result column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, SqlValue)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Appends a column, replacing the value if the name already exists.
    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Returns the value of a column.
    ///
    /// Falls back to a case-insensitive match, since drivers disagree on the
    /// case of unquoted identifiers.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(column))
            })
            .map(|(_, value)| value)
    }

    /// Returns the value at a column position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Reads a column as a typed value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProperty` for an unknown column and `InvalidArgument`
    /// when the value does not convert.
    pub fn get_as<T: FromSqlValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| DbalError::InvalidProperty(format!("no column named '{column}'")))?;
        T::from_sql_value(value)
    }

    /// Returns true if the record has a column with that name.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Builds a record from a JSON object, keeping key order.
    #[must_use]
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .iter()
            .map(|(key, value)| (key.clone(), SqlValue::from_json(value)))
            .collect()
    }
}

impl FromIterator<(String, SqlValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (column, value) in iter {
            record.push(column, value);
        }
        record
    }
}

/// Types that can be hydrated from a row.
pub trait FromRecord: Sized {
    /// Builds a value from a record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProperty` or `InvalidArgument` when the record does not
    /// have the expected shape.
    fn from_record(record: &Record) -> Result<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(record.clone())
    }
}

/// A pull cursor over the rows of one query.
pub struct DataReader {
    handle: Option<Box<dyn NativeResult>>,
    record: Option<Record>,
    rows_read: u64,
}

impl DataReader {
    /// Runs `command` on `conn` and wraps the result.
    ///
    /// # Errors
    ///
    /// Returns the connection's `Query` error if the statement is rejected.
    pub fn new(conn: &mut dyn Connection, command: Command) -> Result<Self> {
        debug!(sql = %command, "Opening data reader");
        let handle = conn.query(command)?;
        Ok(Self::from_native(handle))
    }

    /// Wraps an already obtained native handle.
    #[must_use]
    pub fn from_native(handle: Box<dyn NativeResult>) -> Self {
        Self {
            handle: Some(handle),
            record: None,
            rows_read: 0,
        }
    }

    /// Advances to the next row.
    ///
    /// Returns false once the result is exhausted or the reader was disposed;
    /// the reader then holds no current row. Exhaustion releases the handle.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if fetching fails.
    pub fn read(&mut self) -> Result<bool> {
        let Some(handle) = self.handle.as_mut() else {
            self.record = None;
            return Ok(false);
        };
        match handle.fetch()? {
            Some(record) => {
                self.record = Some(record);
                self.rows_read += 1;
                Ok(true)
            }
            None => {
                self.dispose();
                Ok(false)
            }
        }
    }

    /// Returns the current row, valid after `read()` returned true.
    #[must_use]
    pub const fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Takes ownership of the current row.
    pub fn take_record(&mut self) -> Option<Record> {
        self.record.take()
    }

    /// Returns the number of rows read so far.
    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Returns true once the native handle was released.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.handle.is_none()
    }

    /// Releases the native handle. Safe to call any number of times.
    pub fn dispose(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.free();
            debug!(rows_read = self.rows_read, "Disposed data reader");
        }
        self.record = None;
    }

    /// Reads every remaining row and disposes the reader.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error; the handle is released either way.
    pub fn collect_records(mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while self.read()? {
            if let Some(record) = self.take_record() {
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl std::fmt::Debug for DataReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataReader")
            .field("disposed", &self.is_disposed())
            .field("record", &self.record)
            .field("rows_read", &self.rows_read)
            .finish()
    }
}

impl Drop for DataReader {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Typed rows hydrated from a reader.
///
/// Yields `Err` once if hydration or fetching fails, then stops.
pub struct ResultSet<T> {
    reader: DataReader,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromRecord> ResultSet<T> {
    /// Wraps a reader.
    #[must_use]
    pub const fn new(reader: DataReader) -> Self {
        Self {
            reader,
            _marker: PhantomData,
        }
    }

    /// Releases the underlying reader early.
    pub fn dispose(&mut self) {
        self.reader.dispose();
    }
}

impl<T: FromRecord> Iterator for ResultSet<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read() {
            Ok(true) => {
                let row = match self.reader.record() {
                    Some(record) => T::from_record(record),
                    None => T::from_record(&Record::new()),
                };
                if row.is_err() {
                    self.reader.dispose();
                }
                Some(row)
            }
            Ok(false) => None,
            Err(err) => {
                self.reader.dispose();
                Some(Err(err))
            }
        }
    }
}
