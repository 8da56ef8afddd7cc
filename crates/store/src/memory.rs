//! `MemoryStore` — an in-process [`PropertyStore`].
//!
//! Stands in for Postgres in tests and in fixture-backed runs. Query
//! semantics follow the SQL ones: literal case-sensitive substring city
//! match, prices compared in cents, properties without reviews are never
//! listed.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use db::models::{
    NewProperty, NewUser, Property, PropertyListing, PropertyReview, Reservation,
    ReservationSummary, User,
};
use db::PropertySearch;

use crate::fixtures::Fixtures;
use crate::traits::effective_limit;
use crate::{PropertyStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    properties: Vec<Property>,
    reservations: Vec<Reservation>,
    reviews: Vec<PropertyReview>,
}

impl Tables {
    fn average_rating(&self, property_id: i32) -> Option<f64> {
        let (sum, count) = self
            .reviews
            .iter()
            .filter(|r| r.property_id == property_id)
            .fold((0.0, 0u32), |(sum, count), r| (sum + f64::from(r.rating), count + 1));
        (count > 0).then(|| sum / f64::from(count))
    }
}

/// Lock-guarded tables plus atomic id counters.
///
/// Ids are handed out atomically, so concurrent inserts never share an id.
/// Seeding moves the counters past the largest seeded id; once `i32::MAX`
/// has been used, inserts fail instead of wrapping.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_user_id: AtomicI64,
    next_property_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store; the first generated ids are 1.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_user_id: AtomicI64::new(1),
            next_property_id: AtomicI64::new(1),
        }
    }

    /// A store seeded from every table in `fixtures`.
    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let Fixtures {
            users,
            properties,
            reservations,
            reviews,
        } = fixtures;
        let mut store = Self::new();
        users.into_iter().for_each(|u| store.seed_user(u));
        properties.into_iter().for_each(|p| store.seed_property(p));
        let tables = store.tables_mut();
        tables.reservations.extend(reservations);
        tables.reviews.extend(reviews);
        store
    }

    /// Load `users.json`, `properties.json` and the optional reservation and
    /// review tables from `dir`.
    pub async fn from_fixture_dir(dir: &Path) -> Result<Self, StoreError> {
        Ok(Self::from_fixtures(Fixtures::load_dir(dir).await?))
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.seed_user(user);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.seed_property(property);
        self
    }

    pub fn with_reservation(mut self, reservation: Reservation) -> Self {
        self.tables_mut().reservations.push(reservation);
        self
    }

    pub fn with_review(mut self, property_id: i32, rating: i16) -> Self {
        self.tables_mut()
            .reviews
            .push(PropertyReview { property_id, rating });
        self
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.read().users.len()
    }

    /// Number of stored properties.
    pub fn property_count(&self) -> usize {
        self.read().properties.len()
    }

    fn seed_user(&mut self, user: User) {
        self.next_user_id.fetch_max(i64::from(user.id) + 1, Ordering::SeqCst);
        self.tables_mut().users.push(user);
    }

    fn seed_property(&mut self, property: Property) {
        self.next_property_id
            .fetch_max(i64::from(property.id) + 1, Ordering::SeqCst);
        self.tables_mut().properties.push(property);
    }

    fn tables_mut(&mut self) -> &mut Tables {
        self.tables.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches_filters(search: &PropertySearch, property: &Property) -> bool {
    search.city.as_deref().map_or(true, |city| property.city.contains(city))
        && search.owner_id.map_or(true, |owner| property.owner_id == owner)
        && search
            .minimum_cents()
            .map_or(true, |min| property.cost_per_night >= min)
        && search
            .maximum_cents()
            .map_or(true, |max| property.cost_per_night <= max)
}

/// Take the next id from `counter`, refusing to go past `i32::MAX`.
fn allocate_id(counter: &AtomicI64, table: &str) -> Result<i32, StoreError> {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
            (next <= i64::from(i32::MAX)).then_some(next + 1)
        })
        .ok()
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| StoreError::ConstraintViolation(format!("{table}.id sequence exhausted")))
}

fn truncate_to<T>(mut rows: Vec<T>, limit: Option<i64>) -> Vec<T> {
    let limit = usize::try_from(effective_limit(limit)).unwrap_or(usize::MAX);
    rows.truncate(limit);
    rows
}

#[async_trait]
impl PropertyStore for MemoryStore {
    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read().users.iter().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn get_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn add_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write();
        if tables.users.iter().any(|u| u.email == user.email) {
            warn!("email already registered");
            return Err(StoreError::ConstraintViolation(format!(
                "users.email must be unique: {} is already registered",
                user.email
            )));
        }
        let id = allocate_id(&self.next_user_id, "users")?;
        let created = user.into_user(id);
        tables.users.push(created.clone());
        debug!(id, "user created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn list_reservations_for_guest(
        &self,
        guest_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<ReservationSummary>, StoreError> {
        let tables = self.read();
        let mut rows: Vec<ReservationSummary> = tables
            .reservations
            .iter()
            .filter(|r| r.guest_id == guest_id)
            .filter_map(|r| {
                let property = tables.properties.iter().find(|p| p.id == r.property_id)?;
                let average_rating = tables.average_rating(property.id)?;
                Some(ReservationSummary {
                    id: r.id,
                    property_id: property.id,
                    title: property.title.clone(),
                    start_date: r.start_date,
                    end_date: r.end_date,
                    cost_per_night: property.cost_per_night,
                    cover_photo_url: property.cover_photo_url.clone(),
                    thumbnail_photo_url: property.thumbnail_photo_url.clone(),
                    number_of_bathrooms: property.number_of_bathrooms,
                    number_of_bedrooms: property.number_of_bedrooms,
                    parking_spaces: property.parking_spaces,
                    average_rating,
                })
            })
            .collect();
        rows.sort_by_key(|row| (row.start_date, row.id));
        Ok(truncate_to(rows, limit))
    }

    #[instrument(skip(self))]
    async fn search_properties(
        &self,
        search: Option<&PropertySearch>,
        limit: Option<i64>,
    ) -> Result<Vec<PropertyListing>, StoreError> {
        let search = search.cloned().unwrap_or_default();
        let tables = self.read();
        let mut rows: Vec<PropertyListing> = tables
            .properties
            .iter()
            .filter(|p| matches_filters(&search, p))
            .filter_map(|p| {
                let average_rating = tables.average_rating(p.id)?;
                let rated_enough = search
                    .minimum_rating
                    .map_or(true, |min| average_rating >= min);
                rated_enough.then(|| PropertyListing {
                    property: p.clone(),
                    average_rating,
                })
            })
            .collect();
        rows.sort_by_key(|row| (row.property.cost_per_night, row.property.id));
        Ok(truncate_to(rows, limit))
    }

    #[instrument(skip(self, property), fields(owner_id = property.owner_id, city = %property.city))]
    async fn add_property(&self, property: NewProperty) -> Result<Property, StoreError> {
        let id = allocate_id(&self.next_property_id, "properties")?;
        let created = property.into_property(id);
        self.write().properties.push(created.clone());
        debug!(id, "property created");
        Ok(created)
    }
}
