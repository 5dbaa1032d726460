//! Character/string field types.

use oxide_dbal_core::value::SqlValue;
use regex::Regex;

use super::{expect_text, Field, FieldOptions};
use crate::error::{OrmError, Result};

fn check_length(text: &str, max_length: usize) -> std::result::Result<(), String> {
    if text.chars().count() > max_length {
        return Err(format!(
            "Value exceeds maximum length of {max_length} characters"
        ));
    }
    Ok(())
}

/// A character field with a maximum length and an optional pattern.
#[derive(Debug, Clone)]
pub struct CharField {
    /// Maximum length in characters.
    pub max_length: usize,
    /// Pattern the whole value must match.
    pub pattern: Option<Regex>,
    /// Field options.
    pub options: FieldOptions,
}

impl CharField {
    /// Creates a new `CharField` with the given max length.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            pattern: None,
            options: FieldOptions::new(),
        }
    }

    /// Requires values to match `pattern` in full.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` if the pattern does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| OrmError::InvalidField(format!("invalid pattern '{pattern}': {e}")))?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

impl Field for CharField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> std::result::Result<(), String> {
        let text = expect_text(value, "text")?;
        check_length(text, self.max_length)?;
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                return Err(format!("Value does not match pattern {}", pattern.as_str()));
            }
        }
        Ok(())
    }
}

/// A text field for large strings (no max length).
#[derive(Debug, Clone, Default)]
pub struct TextField {
    /// Field options.
    pub options: FieldOptions,
}

impl TextField {
    /// Creates a new `TextField`.
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

impl Field for TextField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> std::result::Result<(), String> {
        expect_text(value, "text").map(|_| ())
    }
}

/// An email field.
#[derive(Debug, Clone)]
pub struct EmailField {
    /// Maximum length (default 254).
    pub max_length: usize,
    /// Field options.
    pub options: FieldOptions,
}

impl EmailField {
    /// Creates a new `EmailField`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_length: 254,
            options: FieldOptions::new(),
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, length: usize) -> Self {
        self.max_length = length;
        self
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

impl Default for EmailField {
    fn default() -> Self {
        Self::new()
    }
}

impl Field for EmailField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn check(&self, value: &SqlValue) -> std::result::Result<(), String> {
        let text = expect_text(value, "text")?;
        check_length(text, self.max_length)?;

        let invalid = || String::from("Invalid email address");
        let (local, domain) = text.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') || local.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        match domain.rsplit_once('.') {
            Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
            _ => Err(invalid()),
        }
    }
}
