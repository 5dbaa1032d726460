//! Numeric field types.

use oxide_dbal_core::value::SqlValue;

use super::{Field, FieldOptions};

fn integer(value: &SqlValue) -> Result<i64, String> {
    match value {
        SqlValue::Int(n) => Ok(*n),
        SqlValue::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| String::from("Invalid integer value")),
        other => Err(format!("Expected integer, got {}", other.kind())),
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), String> {
    if let Some(min) = min {
        if value < min {
            return Err(format!("Value must be at least {min}"));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(format!("Value must be at most {max}"));
        }
    }
    Ok(())
}

/// A standard integer field (32-bit).
#[derive(Debug, Clone, Default)]
pub struct IntegerField {
    /// Smallest accepted value.
    pub min: Option<i32>,
    /// Largest accepted value.
    pub max: Option<i32>,
    /// Field options.
    pub options: FieldOptions,
}

impl IntegerField {
    /// Creates a new `IntegerField`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts values to `min..=max`.
    #[must_use]
    pub const fn range(mut self, min: i32, max: i32) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

impl Field for IntegerField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> Result<(), String> {
        let value = i32::try_from(integer(value)?)
            .map_err(|_| String::from("Value out of range for a 32-bit integer"))?;
        check_range(value, self.min, self.max)
    }
}

/// A big integer field (64-bit).
#[derive(Debug, Clone, Default)]
pub struct BigIntField {
    /// Smallest accepted value.
    pub min: Option<i64>,
    /// Largest accepted value.
    pub max: Option<i64>,
    /// Field options.
    pub options: FieldOptions,
}

impl BigIntField {
    /// Creates a new `BigIntField`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts values to `min..=max`.
    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

impl Field for BigIntField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> Result<(), String> {
        check_range(integer(value)?, self.min, self.max)
    }
}

/// A floating-point field.
#[derive(Debug, Clone, Default)]
pub struct FloatField {
    /// Smallest accepted value.
    pub min: Option<f64>,
    /// Largest accepted value.
    pub max: Option<f64>,
    /// Field options.
    pub options: FieldOptions,
}

impl FloatField {
    /// Creates a new `FloatField`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts values to `min..=max`.
    #[must_use]
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

impl Field for FloatField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> Result<(), String> {
        let value = match value {
            SqlValue::Float(f) => *f,
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(n) => *n as f64,
            SqlValue::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| String::from("Invalid float value"))?,
            other => return Err(format!("Expected float, got {}", other.kind())),
        };
        if !value.is_finite() {
            return Err(String::from("Value must be finite"));
        }
        check_range(value, self.min, self.max)
    }
}
