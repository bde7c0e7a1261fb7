//! Error types shared by the request pipeline.

use thiserror::Error;

/// Failures that turn a request into a `500 Internal Server Error`, plus the
/// accessor errors that the dispatcher folds into `isSuccessful=false` bodies.
#[derive(Error, Debug)]
pub enum DebugError {
    /// A required query parameter was absent or blank
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    /// A query parameter did not percent-decode to UTF-8
    #[error("could not decode parameter `{name}`: {reason}")]
    Decode { name: String, reason: String },

    /// `updatedData` was not a JSON array of row updates
    #[error("invalid JSON payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// No database is selected, so there is nothing to operate on
    #[error("no database is open")]
    NoDatabaseOpen,

    #[error("invalid target name: {0:?}")]
    InvalidTargetName(String),

    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("preference group not found: {0}")]
    GroupNotFound(String),

    /// A value could not be bound as its declared column type
    #[error("value {value:?} is not a valid {column_type}")]
    InvalidValue { value: String, column_type: &'static str },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for debug server operations
pub type Result<T> = std::result::Result<T, DebugError>;
