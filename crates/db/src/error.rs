//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Postgres rejected the statement because of a unique, foreign-key or
    /// check constraint.
    #[error("constraint violation ({}): {message}", constraint.as_deref().unwrap_or("unnamed"))]
    ConstraintViolation {
        constraint: Option<String>,
        message: String,
    },

    /// The pool could not hand out a working connection.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Any other failure while running or decoding a statement.
    #[error("query error: {0}")]
    Query(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                Self::ConstraintViolation {
                    constraint: db_err.constraint().map(str::to_owned),
                    message: db_err.message().to_owned(),
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => Self::Connection(err),
            other => Self::Query(other),
        }
    }
}
