//! Boolean field type.

use oxide_dbal_core::value::SqlValue;

use super::{Field, FieldOptions};

/// A boolean field.
///
/// Accepts booleans, the integers 0 and 1, and the usual textual spellings,
/// since several engines store booleans as integers.
#[derive(Debug, Clone, Default)]
pub struct BooleanField {
    /// Field options.
    pub options: FieldOptions,
}

impl BooleanField {
    /// Creates a new `BooleanField`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

impl Field for BooleanField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> Result<(), String> {
        match value {
            SqlValue::Bool(_) | SqlValue::Int(0 | 1) => Ok(()),
            SqlValue::Text(text) => match text.to_lowercase().as_str() {
                "true" | "false" | "1" | "0" | "yes" | "no" | "on" | "off" => Ok(()),
                _ => Err(String::from("Value must be a boolean")),
            },
            _ => Err(String::from("Value must be a boolean")),
        }
    }
}
