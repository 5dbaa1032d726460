//! Error types for the ORM.

use oxide_dbal_core::DbalError;
use thiserror::Error;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Error raised by the database abstraction layer.
    #[error("database error: {0}")]
    Database(#[from] DbalError),

    /// No object found matching the query.
    #[error("object not found")]
    NotFound,

    /// Multiple objects found when exactly one was expected.
    #[error("multiple objects returned when one was expected")]
    MultipleObjectsReturned,

    /// A model value failed its field's constraints.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid field name or definition.
    #[error("invalid field: {0}")]
    InvalidField(String),
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
