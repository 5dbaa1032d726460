//! Field types for model definitions.
//!
//! Each field kind is a typed configuration struct. Validation runs on the
//! [`SqlValue`] a model hands to the manager, before any SQL is rendered.

mod boolean;
mod char;
mod numeric;
mod temporal;

use std::fmt;

use oxide_dbal_core::value::SqlValue;

pub use boolean::BooleanField;
pub use char::{CharField, EmailField, TextField};
pub use numeric::{BigIntField, FloatField, IntegerField};
pub use temporal::DateTimeField;

/// Options shared by every field kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Whether the field accepts NULL.
    pub null: bool,
    /// Whether an empty string is accepted.
    pub blank: bool,
    /// Value used when the model provides none.
    pub default: Option<SqlValue>,
    /// Whether the column is unique.
    pub unique: bool,
    /// Whether this is the primary key. A NULL primary key is left to the
    /// database on insert.
    pub primary_key: bool,
    /// Accepted values; empty means any.
    pub choices: Vec<SqlValue>,
}

impl FieldOptions {
    /// Creates options with every flag off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the null option.
    #[must_use]
    pub const fn null(mut self, value: bool) -> Self {
        self.null = value;
        self
    }

    /// Sets the blank option.
    #[must_use]
    pub const fn blank(mut self, value: bool) -> Self {
        self.blank = value;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: SqlValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the unique option.
    #[must_use]
    pub const fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    /// Marks the field as primary key. Primary keys accept NULL.
    #[must_use]
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self.null = value || self.null;
        self
    }

    /// Restricts the field to a set of values.
    #[must_use]
    pub fn choices(mut self, choices: Vec<SqlValue>) -> Self {
        self.choices = choices;
        self
    }
}

/// A field kind.
pub trait Field: fmt::Debug {
    /// Returns the field options.
    fn options(&self) -> &FieldOptions;

    /// Checks a non-NULL value against the kind's constraints.
    fn check(&self, value: &SqlValue) -> Result<(), String>;

    /// Returns the value the manager stores regardless of the model, such as
    /// the current time for auto timestamps.
    fn auto_value(&self, _creating: bool) -> Option<SqlValue> {
        None
    }

    /// Validates a value: nullability, blank strings, choices, then the
    /// kind's own constraints.
    fn validate(&self, value: &SqlValue) -> Result<(), String> {
        let options = self.options();
        if value.is_null() {
            return if options.null {
                Ok(())
            } else {
                Err(String::from("This field cannot be null"))
            };
        }
        if let SqlValue::Text(text) = value {
            if text.is_empty() && !options.blank {
                return Err(String::from("This field cannot be blank"));
            }
        }
        if !options.choices.is_empty() && !options.choices.contains(value) {
            return Err(format!("Value {value:?} is not a valid choice"));
        }
        self.check(value)
    }
}

/// A named column and its field kind.
#[derive(Debug)]
pub struct FieldDef {
    /// Column name.
    pub column: &'static str,
    /// Field kind and options.
    pub field: Box<dyn Field>,
}

impl FieldDef {
    /// Pairs a column with a field kind.
    pub fn new(column: &'static str, field: impl Field + 'static) -> Self {
        Self {
            column,
            field: Box::new(field),
        }
    }

    /// Returns true if the field is the primary key.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.field.options().primary_key
    }
}

/// Returns the text of a value, or an error naming the expected kind.
fn expect_text<'a>(value: &'a SqlValue, kind: &str) -> Result<&'a str, String> {
    match value {
        SqlValue::Text(text) => Ok(text),
        other => Err(format!("Expected {kind}, got {}", other.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_requires_option() {
        let field = IntegerField::new();
        assert!(field.validate(&SqlValue::Null).is_err());
        let field = IntegerField::new().options(FieldOptions::new().null(true));
        assert!(field.validate(&SqlValue::Null).is_ok());
    }

    #[test]
    fn test_primary_key_accepts_null() {
        let field = BigIntField::new().options(FieldOptions::new().primary_key(true));
        assert!(field.validate(&SqlValue::Null).is_ok());
    }

    #[test]
    fn test_blank_and_choices() {
        let field = CharField::new(10);
        assert!(field.validate(&SqlValue::Text(String::new())).is_err());

        let field = CharField::new(10).options(
            FieldOptions::new().choices(vec![
                SqlValue::Text(String::from("draft")),
                SqlValue::Text(String::from("published")),
            ]),
        );
        assert!(field.validate(&SqlValue::Text(String::from("draft"))).is_ok());
        assert!(field.validate(&SqlValue::Text(String::from("deleted"))).is_err());
    }
}
