//! The connection contract consumed by builders, readers and lock builders.
//!
//! Connection management itself (sockets, authentication, pooling) belongs to
//! the implementing crate. The core only needs to execute text, obtain a row
//! cursor and drive transactions.

use std::any::Any;
use std::collections::VecDeque;

use crate::command::Command;
use crate::config::DataSource;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::reader::Record;

/// A native query result handle.
///
/// Implementations wrap whatever the driver hands back for a query and expose
/// it as "fetch the next associative row" plus "release".
pub trait NativeResult {
    /// Fetches the next row, or `None` when exhausted.
    ///
    /// # Errors
    ///
    /// Returns a `Query` error if the driver fails mid-iteration.
    fn fetch(&mut self) -> Result<Option<Record>>;

    /// Releases the handle. Calling it more than once is a no-op.
    fn free(&mut self);
}

/// A result fully materialized in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedResult {
    rows: VecDeque<Record>,
    freed: bool,
}

impl BufferedResult {
    /// Wraps already fetched rows.
    #[must_use]
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows: rows.into(),
            freed: false,
        }
    }

    /// Returns the number of rows not yet fetched.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl NativeResult for BufferedResult {
    fn fetch(&mut self) -> Result<Option<Record>> {
        if self.freed {
            return Ok(None);
        }
        Ok(self.rows.pop_front())
    }

    fn free(&mut self) {
        self.freed = true;
        self.rows.clear();
    }
}

/// A connection capable of executing commands.
pub trait Connection {
    /// Returns the descriptor this connection was opened from.
    fn data_source(&self) -> &DataSource;

    /// Returns the dialect statements for this connection must render in.
    fn dialect(&self) -> Dialect {
        self.data_source().dialect
    }

    /// Returns the native driver handle for calls the contract does not cover.
    ///
    /// Use [`resource_as`](#method.resource_as) to recover the concrete type.
    fn get_resource(&mut self) -> &mut dyn Any;

    /// Executes a command that returns no rows.
    ///
    /// Returns the number of affected rows when the driver reports it.
    ///
    /// # Errors
    ///
    /// Returns `Query` with the driver's reason when the statement is rejected.
    fn execute(&mut self, command: Command) -> Result<u64>;

    /// Executes a command and returns its native result handle.
    ///
    /// # Errors
    ///
    /// Returns `Query` with the driver's reason when the statement is rejected.
    fn query(&mut self, command: Command) -> Result<Box<dyn NativeResult>>;

    /// Begins a transaction.
    ///
    /// # Errors
    ///
    /// Returns `Query` if the driver refuses.
    fn begin_transaction(&mut self) -> Result<()>;

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Returns `Query` if the driver refuses.
    fn commit(&mut self) -> Result<()>;

    /// Rolls back the current transaction.
    ///
    /// # Errors
    ///
    /// Returns `Query` if the driver refuses.
    fn rollback(&mut self) -> Result<()>;
}

impl<'a> dyn Connection + 'a {
    /// Returns the native handle as `T`, or `None` if the driver uses another
    /// handle type.
    pub fn resource_as<T: Any>(&mut self) -> Option<&mut T> {
        self.get_resource().downcast_mut::<T>()
    }
}
