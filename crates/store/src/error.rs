//! Store-level error type.

use std::path::PathBuf;

use thiserror::Error;

use db::DbError;

/// Errors returned by a [`crate::PropertyStore`].
///
/// A lookup that finds nothing is `Ok(None)`, not an error, so callers can
/// tell "no such row" apart from a failed query.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write broke a datastore constraint (e.g. duplicate email).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The datastore could not be reached in time.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// The statement ran but failed.
    #[error("query failure: {0}")]
    QueryFailure(String),

    /// A fixture file could not be read.
    #[error("cannot read fixture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixture file is not valid JSON of the expected shape.
    #[error("invalid fixture {}: {message}", path.display())]
    Fixture { path: PathBuf, message: String },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConstraintViolation { .. } => Self::ConstraintViolation(err.to_string()),
            DbError::Connection(_) => Self::ConnectionFailure(err.to_string()),
            DbError::Query(_) => Self::QueryFailure(err.to_string()),
        }
    }
}
