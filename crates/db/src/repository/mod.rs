//! Repository functions — one function per database operation.
//!
//! Every function takes a `&DbPool` and returns a `Result<T, DbError>`.
//! Lookups that may miss return `Option`; no business logic lives here.

pub mod users;
pub mod reservations;
pub mod properties;
