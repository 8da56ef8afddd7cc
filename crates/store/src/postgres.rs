//! Postgres-backed [`PropertyStore`].
//!
//! Every operation is one repository call. Failures are logged here and then
//! returned to the caller.

use async_trait::async_trait;
use tracing::{error, instrument, warn};

use db::models::{NewProperty, NewUser, Property, PropertyListing, ReservationSummary, User};
use db::repository::{properties as property_repo, reservations as reservation_repo, users as user_repo};
use db::{DbError, DbPool, PropertySearch};

use crate::traits::effective_limit;
use crate::{PropertyStore, StoreError};

/// A [`PropertyStore`] over a shared connection pool.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Log a failed repository call and convert it for the caller.
fn reported<T>(operation: &'static str, result: Result<T, DbError>) -> Result<T, StoreError> {
    result.map_err(|err| {
        if err.is_constraint_violation() {
            warn!(operation, error = %err, "write rejected by constraint");
        } else {
            error!(operation, error = %err, "database operation failed");
        }
        StoreError::from(err)
    })
}

#[async_trait]
impl PropertyStore for PgStore {
    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        reported(
            "get_user_by_email",
            user_repo::get_user_by_email(&self.pool, email).await,
        )
    }

    #[instrument(skip(self))]
    async fn get_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        reported("get_user_by_id", user_repo::get_user_by_id(&self.pool, id).await)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn add_user(&self, user: NewUser) -> Result<User, StoreError> {
        reported("add_user", user_repo::insert_user(&self.pool, &user).await)
    }

    #[instrument(skip(self))]
    async fn list_reservations_for_guest(
        &self,
        guest_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<ReservationSummary>, StoreError> {
        reported(
            "list_reservations_for_guest",
            reservation_repo::list_for_guest(&self.pool, guest_id, effective_limit(limit)).await,
        )
    }

    #[instrument(skip(self))]
    async fn search_properties(
        &self,
        search: Option<&PropertySearch>,
        limit: Option<i64>,
    ) -> Result<Vec<PropertyListing>, StoreError> {
        reported(
            "search_properties",
            property_repo::search_properties(&self.pool, search, effective_limit(limit)).await,
        )
    }

    #[instrument(skip(self, property), fields(owner_id = property.owner_id, city = %property.city))]
    async fn add_property(&self, property: NewProperty) -> Result<Property, StoreError> {
        reported(
            "add_property",
            property_repo::insert_property(&self.pool, &property).await,
        )
    }
}
