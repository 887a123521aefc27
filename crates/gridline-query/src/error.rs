//! Error types for the query engine.

use thiserror::Error;

/// Errors that can occur when building or executing queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Operator name not recognized while evaluating in strict mode.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Page size must be at least one.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// A condition with the same id already exists in the list.
    #[error("duplicate condition id '{0}'")]
    DuplicateConditionId(String),

    /// No condition with the given id exists in the list.
    #[error("no condition with id '{0}'")]
    ConditionNotFound(String),

    /// No saved filter has the given id or name.
    #[error("no saved filter '{0}'")]
    FilterNotFound(String),

    /// The condition references a field that is not declared.
    #[error("unknown filter field '{0}'")]
    UnknownField(String),

    /// The operator is not allowed for the declared field.
    #[error("operator '{op}' is not allowed for field '{field}'")]
    OperatorNotAllowed { field: String, op: String },

    /// Failure in the backing key-value store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Serialization failure while persisting or exporting.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// CSV export failure.
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by [`KeyValueStore`](crate::KeyValueStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure in a file-backed store.
    #[error("store I/O error at {}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
