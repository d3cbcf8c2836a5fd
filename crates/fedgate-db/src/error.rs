//! Error types for the fedgate-db crate.

use thiserror::Error;

/// Directory store operation errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A store query failed to execute.
    #[error("Directory query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// A uniqueness constraint was violated.
    ///
    /// Raised by the store when a unique index rejects a write, so callers
    /// can surface a protocol-level conflict even when two requests race
    /// past an application-level existence check.
    #[error("Duplicate value '{value}' for unique field '{field}'")]
    Conflict { field: String, value: String },
}

impl DirectoryError {
    /// Check if this error indicates a uniqueness conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, DirectoryError::Conflict { .. })
    }
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            // 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return DirectoryError::Conflict {
                    field: db_err.constraint().unwrap_or("unknown").to_string(),
                    value: String::new(),
                };
            }
        }
        DirectoryError::QueryFailed(err)
    }
}
