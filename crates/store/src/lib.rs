//! `store` crate — the `PropertyStore` trait and its implementations.
//!
//! Callers construct one store at start-up (Postgres via [`PgStore`], or the
//! in-process [`MemoryStore`]) and pass it around as `Arc<dyn PropertyStore>`.

pub mod error;
pub mod traits;
pub mod postgres;
pub mod memory;
pub mod fixtures;

pub use error::StoreError;
pub use traits::{PropertyStore, DEFAULT_LIMIT};
pub use postgres::PgStore;
pub use memory::MemoryStore;
pub use fixtures::Fixtures;

pub use db::models::{
    NewProperty, NewUser, Property, PropertyListing, PropertyReview, Reservation,
    ReservationSummary, User,
};
pub use db::PropertySearch;

#[cfg(test)]
mod memory_tests;
