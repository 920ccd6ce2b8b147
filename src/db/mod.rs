//! SQLite persistence. Every function takes the pool explicitly; multi-row
//! writes run inside a single transaction.

pub mod goals;
pub mod routes;
pub mod runs;
pub mod users;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub async fn create_pool(database_url: &str) -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await
        .expect("Failed to create database pool")
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Fresh in-memory database with the schema applied. A single connection
/// keeps every query on the same in-memory database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
pub async fn test_user(pool: &SqlitePool, email: &str) -> crate::models::user::User {
    users::create_user(
        pool,
        &crate::models::user::NewUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".into(),
            first_name: "Test".into(),
            last_name: "Runner".into(),
            birthdate: None,
            sex: None,
            zipcode: Some("94110".into()),
        },
    )
    .await
    .unwrap()
}
