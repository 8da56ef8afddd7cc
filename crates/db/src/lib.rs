//! `db` crate — pure persistence layer.
//!
//! Provides a connection pool with timeouts, typed row structs, the
//! property-search query builder and repository functions for every
//! statement the LightBnB store issues. No business logic lives here.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;
pub mod search;

pub use pool::{DbPool, PoolConfig};
pub use error::DbError;
pub use search::PropertySearch;
