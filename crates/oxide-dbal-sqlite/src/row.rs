//! Conversion between sqlx SQLite rows/arguments and core values.

use oxide_dbal_core::reader::Record;
use oxide_dbal_core::value::SqlValue;
use oxide_dbal_core::{DbalError, Result};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Converts one native row into a record, keeping column order.
///
/// Values are read by their runtime storage class, so untyped expressions
/// (`SELECT 1 + 1`) convert as well as declared columns.
pub(crate) fn record_from_row(row: &SqliteRow) -> Result<Record> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index).map_err(decode_error)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let storage = raw.type_info().name().to_ascii_uppercase();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(index).map_err(decode_error)?),
                "REAL" => SqlValue::Float(row.try_get_unchecked(index).map_err(decode_error)?),
                "BLOB" => SqlValue::Blob(row.try_get_unchecked(index).map_err(decode_error)?),
                _ => SqlValue::Text(row.try_get_unchecked(index).map_err(decode_error)?),
            }
        };
        record.push(column.name(), value);
    }
    Ok(record)
}

/// Binds positional parameters in order.
pub(crate) fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: Vec<SqlValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Bool(value) => query.bind(value),
            SqlValue::Int(value) => query.bind(value),
            SqlValue::Float(value) => query.bind(value),
            SqlValue::Text(value) | SqlValue::Raw(value) => query.bind(value),
            SqlValue::Blob(value) => query.bind(value),
            SqlValue::Timestamp(value) => query.bind(value),
        };
    }
    query
}

fn decode_error(err: sqlx::Error) -> DbalError {
    DbalError::query(err.to_string())
}
