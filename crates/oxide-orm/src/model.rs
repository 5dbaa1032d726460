//! Model trait.
//!
//! A model maps one table to a Rust type: its columns are described by typed
//! [`FieldDef`]s, rows hydrate through [`FromRecord`], and instances hand their
//! values back as [`SqlValue`]s for validation and persistence.

use oxide_dbal_core::reader::FromRecord;
use oxide_dbal_core::value::SqlValue;

use crate::error::{OrmError, Result};
use crate::fields::FieldDef;
use crate::manager::Manager;

/// A database model.
///
/// # Example
///
/// ```rust
/// use oxide_dbal_core::reader::{FromRecord, Record};
/// use oxide_dbal_core::value::SqlValue;
/// use oxide_orm::fields::{BigIntField, CharField, FieldDef, FieldOptions};
/// use oxide_orm::Model;
///
/// struct Tag {
///     id: Option<i64>,
///     name: String,
/// }
///
/// impl FromRecord for Tag {
///     fn from_record(record: &Record) -> oxide_dbal_core::Result<Self> {
///         Ok(Self {
///             id: record.get_as("id")?,
///             name: record.get_as("name")?,
///         })
///     }
/// }
///
/// impl Model for Tag {
///     const TABLE: &'static str = "tags";
///
///     fn fields() -> Vec<FieldDef> {
///         vec![
///             FieldDef::new("id", BigIntField::new().options(FieldOptions::new().primary_key(true))),
///             FieldDef::new("name", CharField::new(3)),
///         ]
///     }
///
///     fn values(&self) -> Vec<(&'static str, SqlValue)> {
///         vec![
///             ("id", self.id.map_or(SqlValue::Null, SqlValue::Int)),
///             ("name", SqlValue::Text(self.name.clone())),
///         ]
///     }
/// }
///
/// let tag = Tag { id: None, name: String::from("rust") };
/// assert!(tag.validate().is_err());
/// assert_eq!(Tag::primary_key().unwrap(), "id");
/// ```
pub trait Model: FromRecord + Sized {
    /// Table name.
    const TABLE: &'static str;

    /// Returns the column definitions in column order.
    fn fields() -> Vec<FieldDef>;

    /// Returns this instance's values by column.
    ///
    /// Columns left out take their field default, or NULL.
    fn values(&self) -> Vec<(&'static str, SqlValue)>;

    /// Returns the column names in column order.
    fn columns() -> Vec<&'static str> {
        Self::fields().iter().map(|def| def.column).collect()
    }

    /// Returns the primary key column.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` if no field is marked as primary key.
    fn primary_key() -> Result<&'static str> {
        Self::fields()
            .iter()
            .find(|def| def.is_primary_key())
            .map(|def| def.column)
            .ok_or_else(|| OrmError::InvalidField(format!("{} has no primary key", Self::TABLE)))
    }

    /// Returns the primary key value of this instance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` if the model has no primary key.
    fn pk(&self) -> Result<SqlValue> {
        let column = Self::primary_key()?;
        Ok(self
            .values()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map_or(SqlValue::Null, |(_, value)| value))
    }

    /// Validates every value against its field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` for a value without a field and `Validation`
    /// naming the first column that fails.
    fn validate(&self) -> Result<()> {
        resolve(&Self::fields(), self.values(), None).map(|_| ())
    }

    /// Returns a manager for this model.
    #[must_use]
    fn objects() -> Manager<Self> {
        Manager::new()
    }
}

/// Resolves the value stored for every field, in field order, and validates
/// it. `creating` is `Some` when the values are about to be written and
/// selects which automatic values apply.
pub(crate) fn resolve(
    fields: &[FieldDef],
    values: Vec<(&'static str, SqlValue)>,
    creating: Option<bool>,
) -> Result<Vec<(&'static str, SqlValue)>> {
    if let Some((column, _)) = values
        .iter()
        .find(|(column, _)| !fields.iter().any(|def| def.column == *column))
    {
        return Err(OrmError::InvalidField(String::from(*column)));
    }

    let mut resolved = Vec::with_capacity(fields.len());
    for def in fields {
        let options = def.field.options();
        let automatic = creating.and_then(|creating| def.field.auto_value(creating));
        let value = automatic
            .or_else(|| {
                values
                    .iter()
                    .find(|(column, _)| *column == def.column)
                    .map(|(_, value)| value.clone())
            })
            .or_else(|| options.default.clone())
            .unwrap_or(SqlValue::Null);
        def.field
            .validate(&value)
            .map_err(|message| OrmError::Validation(format!("{}: {message}", def.column)))?;
        resolved.push((def.column, value));
    }
    Ok(resolved)
}
