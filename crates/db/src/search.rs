//! Dynamic SQL for property search.
//!
//! Predicates are appended in a fixed order and bound with
//! `QueryBuilder::push_bind`, so the `$n` placeholders always line up with
//! the argument list regardless of which filters are present.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

/// Optional filters for [`crate::repository::properties::search_properties`].
///
/// Every field is independent; an all-`None` search matches every reviewed
/// property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySearch {
    /// Case-sensitive substring of the city name.
    pub city: Option<String>,
    pub owner_id: Option<i32>,
    /// Decimal currency units; compared against cents.
    pub minimum_price_per_night: Option<f64>,
    pub maximum_price_per_night: Option<f64>,
    /// Lower bound on the average review rating.
    pub minimum_rating: Option<f64>,
}

impl PropertySearch {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.owner_id.is_none()
            && self.minimum_price_per_night.is_none()
            && self.maximum_price_per_night.is_none()
            && self.minimum_rating.is_none()
    }

    pub fn minimum_cents(&self) -> Option<i32> {
        self.minimum_price_per_night.map(dollars_to_cents)
    }

    pub fn maximum_cents(&self) -> Option<i32> {
        self.maximum_price_per_night.map(dollars_to_cents)
    }
}

/// Convert a price in currency units to the integer cents stored in
/// `properties.cost_per_night`.
pub fn dollars_to_cents(dollars: f64) -> i32 {
    (dollars * 100.0).round() as i32
}

/// `LIKE` pattern matching `city` as a literal substring.
///
/// `\`, `%` and `_` are escaped with Postgres' default `LIKE` escape
/// character, so caller input never acts as a wildcard.
pub fn city_pattern(city: &str) -> String {
    let mut pattern = String::with_capacity(city.len() + 2);
    pattern.push('%');
    for ch in city.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

const SELECT_LISTINGS: &str = "SELECT properties.*, AVG(property_reviews.rating)::float8 AS average_rating \
     FROM properties \
     JOIN property_reviews ON properties.id = property_reviews.property_id";

/// Build the search statement for `search` with `limit` bound last.
pub fn build_search_query(search: Option<&PropertySearch>, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_LISTINGS);
    let search = search.cloned().unwrap_or_default();
    let mut keyword = " WHERE ";

    if let Some(city) = search.city.as_deref() {
        builder.push(keyword).push("properties.city LIKE ");
        builder.push_bind(city_pattern(city));
        keyword = " AND ";
    }
    if let Some(owner_id) = search.owner_id {
        builder.push(keyword).push("properties.owner_id = ");
        builder.push_bind(owner_id);
        keyword = " AND ";
    }
    if let Some(cents) = search.minimum_cents() {
        builder.push(keyword).push("properties.cost_per_night >= ");
        builder.push_bind(cents);
        keyword = " AND ";
    }
    if let Some(cents) = search.maximum_cents() {
        builder.push(keyword).push("properties.cost_per_night <= ");
        builder.push_bind(cents);
    }

    builder.push(" GROUP BY properties.id");

    if let Some(rating) = search.minimum_rating {
        builder.push(" HAVING AVG(property_reviews.rating) >= ");
        builder.push_bind(rating);
    }

    builder.push(" ORDER BY properties.cost_per_night, properties.id LIMIT ");
    builder.push_bind(limit);
    builder
}
