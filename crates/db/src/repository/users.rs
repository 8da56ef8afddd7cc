//! User lookups and creation.

use sqlx::PgPool;

use crate::{
    DbError,
    models::{NewUser, User},
};

/// Fetch the user with exactly this email, if any.
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DbError> {
    let row = sqlx::query_as::<_, User>(
        r#"SELECT id, name, email, password FROM users WHERE email = $1"#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Fetch a single user by primary key.
pub async fn get_user_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, DbError> {
    let row = sqlx::query_as::<_, User>(
        r#"SELECT id, name, email, password FROM users WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a new user and return it with its generated id.
///
/// A duplicate email surfaces as `DbError::ConstraintViolation` from the
/// `users.email` unique constraint.
pub async fn insert_user(pool: &PgPool, user: &NewUser) -> Result<User, DbError> {
    let row = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, password
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
