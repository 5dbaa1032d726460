//! Error types for the database abstraction layer.

use crate::dialect::Dialect;

/// Errors raised while building, rendering or executing statements.
#[derive(Debug, thiserror::Error)]
pub enum DbalError {
    /// The native driver rejected a statement.
    #[error("Failed to execute SQL statement. Reason: {message}")]
    Query {
        /// The driver's error text, verbatim.
        message: String,
    },

    /// The native connect call failed.
    #[error("Failed to establish connection. Reason: {message}")]
    Connection {
        /// The driver's error text, verbatim.
        message: String,
    },

    /// A builder or adaptor received input outside its accepted contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An unknown key was accessed on a record or metadata map.
    #[error("Invalid property: {0}")]
    InvalidProperty(String),

    /// The dialect has no implementation of the requested component.
    #[error("Dialect {dialect} does not support {feature}")]
    UnsupportedDialect {
        /// Dialect that was asked for the component.
        dialect: Dialect,
        /// Name of the missing component.
        feature: &'static str,
    },

    /// Malformed or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (reading configuration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbalError {
    /// Creates a query error carrying the driver's message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates a connection error carrying the driver's message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

/// Result type for database abstraction operations.
pub type Result<T> = std::result::Result<T, DbalError>;
