//! Property search and creation.

use sqlx::PgPool;

use crate::{
    DbError,
    models::{NewProperty, Property, PropertyListing},
    search::{build_search_query, PropertySearch},
};

/// Run a filtered property search, cheapest first.
pub async fn search_properties(
    pool: &PgPool,
    search: Option<&PropertySearch>,
    limit: i64,
) -> Result<Vec<PropertyListing>, DbError> {
    let mut query = build_search_query(search, limit);
    let rows = query
        .build_query_as::<PropertyListing>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Insert a new property and return it with its generated id.
pub async fn insert_property(pool: &PgPool, property: &NewProperty) -> Result<Property, DbError> {
    let row = sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO properties
            (owner_id, title, description, thumbnail_photo_url, cover_photo_url,
             cost_per_night, parking_spaces, number_of_bathrooms, number_of_bedrooms,
             country, street, city, province, post_code, active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id, owner_id, title, description, thumbnail_photo_url, cover_photo_url,
                  cost_per_night, parking_spaces, number_of_bathrooms, number_of_bedrooms,
                  country, street, city, province, post_code, active
        "#,
    )
    .bind(property.owner_id)
    .bind(&property.title)
    .bind(&property.description)
    .bind(&property.thumbnail_photo_url)
    .bind(&property.cover_photo_url)
    .bind(property.cost_per_night)
    .bind(property.parking_spaces)
    .bind(property.number_of_bathrooms)
    .bind(property.number_of_bedrooms)
    .bind(&property.country)
    .bind(&property.street)
    .bind(&property.city)
    .bind(&property.province)
    .bind(&property.post_code)
    .bind(property.active)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
