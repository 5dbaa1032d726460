//! Rendered commands.

use std::fmt;

use crate::value::SqlValue;

/// Rendered SQL text ready for a connection, with optional positional
/// parameters for connections that bind them.
///
/// A command is consumed by the connection call that runs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    text: String,
    params: Vec<SqlValue>,
    terminated: bool,
}

impl Command {
    /// Creates an unterminated command without parameters.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
            terminated: false,
        }
    }

    /// Creates a command with positional parameters.
    #[must_use]
    pub fn with_params(text: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            text: text.into(),
            params,
            terminated: false,
        }
    }

    /// Sets whether `;` is appended when the command is displayed.
    #[must_use]
    pub const fn terminated(mut self, terminated: bool) -> Self {
        self.terminated = terminated;
        self
    }

    /// Returns the SQL text without terminator.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the positional parameters.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns true if the command is terminated.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Consumes the command into its full SQL text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        let sql = self.to_string();
        (sql, self.params)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        if self.terminated {
            f.write_str(";")?;
        }
        Ok(())
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
