use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::route::{CreateRouteRequest, Route};

pub async fn create_route(
    db: &SqlitePool,
    user_id: Uuid,
    route: &CreateRouteRequest,
) -> Result<Route, sqlx::Error> {
    sqlx::query_as::<_, Route>(
        r#"
        INSERT INTO routes (id, user_id, title, location_description, notes, distance, html_embed, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&route.title)
    .bind(&route.location_description)
    .bind(&route.notes)
    .bind(route.distance)
    .bind(&route.html_embed)
    .bind(Utc::now())
    .fetch_one(db)
    .await
}

/// Newest first.
pub async fn list_routes(db: &SqlitePool, user_id: Uuid) -> Result<Vec<Route>, sqlx::Error> {
    sqlx::query_as::<_, Route>(
        "SELECT * FROM routes WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn get_route(db: &SqlitePool, user_id: Uuid, route_id: Uuid) -> Result<Option<Route>, sqlx::Error> {
    sqlx::query_as::<_, Route>("SELECT * FROM routes WHERE id = ? AND user_id = ?")
        .bind(route_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}
