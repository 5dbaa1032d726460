//! Temporal (date/time) field types.

use chrono::NaiveDateTime;
use oxide_dbal_core::value::{SqlValue, TIMESTAMP_FORMAT};

use super::{Field, FieldOptions};

/// A date and time field without zone.
#[derive(Debug, Clone, Default)]
pub struct DateTimeField {
    /// Whether to set the value to now on creation.
    pub auto_now_add: bool,
    /// Whether to set the value to now on every save.
    pub auto_now: bool,
    /// Field options.
    pub options: FieldOptions,
}

impl DateTimeField {
    /// Creates a new `DateTimeField`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value to now when the row is inserted.
    #[must_use]
    pub const fn auto_now_add(mut self) -> Self {
        self.auto_now_add = true;
        self
    }

    /// Sets the value to now on every insert and update.
    #[must_use]
    pub const fn auto_now(mut self) -> Self {
        self.auto_now = true;
        self
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

impl Field for DateTimeField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> Result<(), String> {
        match value {
            SqlValue::Timestamp(_) => Ok(()),
            SqlValue::Text(text) => NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
                .map(|_| ())
                .map_err(|_| format!("Date and time must be in {TIMESTAMP_FORMAT} format")),
            other => Err(format!("Expected timestamp, got {}", other.kind())),
        }
    }

    fn auto_value(&self, creating: bool) -> Option<SqlValue> {
        (self.auto_now || (creating && self.auto_now_add))
            .then(|| SqlValue::Timestamp(chrono::Utc::now().naive_utc()))
    }
}
