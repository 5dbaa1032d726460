//! SQL values.
//!
//! Values flow two ways: into statements (through [`ToSqlValue`], rendered by a
//! dialect's precompiler) and out of data readers (through [`FromSqlValue`]).

use chrono::NaiveDateTime;

use crate::error::{DbalError, Result};

/// A SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
    /// Raw SQL emitted verbatim.
    ///
    /// **Warning**: the caller is responsible for escaping anything inside.
    Raw(String),
}

impl SqlValue {
    /// Returns true for `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the name of the variant, used in conversion errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::Raw(_) => "expression",
        }
    }

    /// Converts a JSON scalar into a value.
    ///
    /// Arrays and objects are kept as their JSON text.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Creates a raw SQL expression that is emitted verbatim.
#[must_use]
pub fn raw(sql: impl Into<String>) -> SqlValue {
    SqlValue::Raw(sql.into())
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for &SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_sql_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

/// Trait for types that can be read back out of a SQL value.
pub trait FromSqlValue: Sized {
    /// Converts a value read from a row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the value cannot represent `Self`.
    fn from_sql_value(value: &SqlValue) -> Result<Self>;
}

fn mismatch(expected: &str, value: &SqlValue) -> DbalError {
    DbalError::InvalidArgument(format!(
        "cannot convert {} value to {expected}",
        value.kind()
    ))
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int(n) => Ok(*n),
            SqlValue::Bool(b) => Ok(Self::from(*b)),
            SqlValue::Text(s) => s.trim().parse().map_err(|_| mismatch("i64", value)),
            _ => Err(mismatch("i64", value)),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        let n = i64::from_sql_value(value)?;
        Self::try_from(n).map_err(|_| mismatch("i32", value))
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(n) => Ok(*n as Self),
            SqlValue::Text(s) => s.trim().parse().map_err(|_| mismatch("f64", value)),
            _ => Err(mismatch("f64", value)),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(n) => Ok(*n != 0),
            SqlValue::Text(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "y" | "yes" => Ok(true),
                "false" | "f" | "0" | "n" | "no" => Ok(false),
                _ => Err(mismatch("bool", value)),
            },
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(s) | SqlValue::Raw(s) => Ok(s.clone()),
            SqlValue::Int(n) => Ok(n.to_string()),
            SqlValue::Float(f) => Ok(f.to_string()),
            SqlValue::Bool(b) => Ok(b.to_string()),
            SqlValue::Timestamp(ts) => Ok(ts.format(TIMESTAMP_FORMAT).to_string()),
            _ => Err(mismatch("String", value)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Blob(b) => Ok(b.clone()),
            SqlValue::Text(s) => Ok(s.clone().into_bytes()),
            _ => Err(mismatch("Vec<u8>", value)),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Timestamp(ts) => Ok(*ts),
            SqlValue::Text(s) => Self::parse_from_str(s, TIMESTAMP_FORMAT)
                .or_else(|_| Self::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                .map_err(|_| mismatch("NaiveDateTime", value)),
            _ => Err(mismatch("NaiveDateTime", value)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_sql_value(value).map(Some)
        }
    }
}

/// Timestamp layout used for literals and text conversion.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
