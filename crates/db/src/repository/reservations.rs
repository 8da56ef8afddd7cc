//! Guest reservation history.

use sqlx::PgPool;

use crate::{DbError, models::ReservationSummary};

/// Return up to `limit` reservations made by `guest_id`, earliest first.
///
/// Each row carries a summary of the reserved property and the average of
/// its review ratings, hence the `GROUP BY`. Properties with no reviews drop
/// out of the inner join.
pub async fn list_for_guest(
    pool: &PgPool,
    guest_id: i32,
    limit: i64,
) -> Result<Vec<ReservationSummary>, DbError> {
    let rows = sqlx::query_as::<_, ReservationSummary>(
        r#"
        SELECT reservations.id,
               reservations.property_id,
               properties.title,
               reservations.start_date,
               reservations.end_date,
               properties.cost_per_night,
               properties.cover_photo_url,
               properties.thumbnail_photo_url,
               properties.number_of_bathrooms,
               properties.number_of_bedrooms,
               properties.parking_spaces,
               AVG(property_reviews.rating)::float8 AS average_rating
        FROM reservations
        JOIN properties ON reservations.property_id = properties.id
        JOIN property_reviews ON property_reviews.property_id = properties.id
        WHERE reservations.guest_id = $1
        GROUP BY reservations.id, properties.id
        ORDER BY reservations.start_date, reservations.id
        LIMIT $2
        "#,
    )
    .bind(guest_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
