//! The `PropertyStore` trait — the data-access contract route handlers use.

use async_trait::async_trait;

use db::models::{NewProperty, NewUser, Property, PropertyListing, ReservationSummary, User};
use db::PropertySearch;

use crate::StoreError;

/// Row cap used when the caller does not pass a limit.
pub const DEFAULT_LIMIT: i64 = 10;

/// Resolve an optional caller limit; negative values are treated as zero.
pub fn effective_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).max(0)
}

/// The six LightBnB data-access operations.
///
/// Implemented by [`crate::PgStore`] for Postgres and by
/// [`crate::MemoryStore`] for tests and fixture-backed runs. Each call is a
/// single request with a single response.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Look up a user by exact email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by id.
    async fn get_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;

    /// Create a user. Fails with `ConstraintViolation` when the email is taken.
    async fn add_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// A guest's reservations, earliest `start_date` first, at most `limit`
    /// (default [`DEFAULT_LIMIT`]).
    async fn list_reservations_for_guest(
        &self,
        guest_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<ReservationSummary>, StoreError>;

    /// Reviewed properties matching `search`, cheapest first, at most `limit`
    /// (default [`DEFAULT_LIMIT`]).
    async fn search_properties(
        &self,
        search: Option<&PropertySearch>,
        limit: Option<i64>,
    ) -> Result<Vec<PropertyListing>, StoreError>;

    /// Create a property and return it with its generated id.
    async fn add_property(&self, property: NewProperty) -> Result<Property, StoreError>;
}
