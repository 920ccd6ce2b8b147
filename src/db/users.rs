use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::user::{NewUser, User};

pub async fn create_user(db: &SqlitePool, user: &NewUser) -> Result<User, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, birthdate, sex, zipcode, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.birthdate)
    .bind(&user.sex)
    .bind(&user.zipcode)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
}

pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn find_by_id(db: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn email_taken(db: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}
