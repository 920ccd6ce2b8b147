use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::route::{CreateRouteRequest, Route};
use crate::AppState;

pub async fn create_route(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateRouteRequest>,
) -> AppResult<Json<Route>> {
    body.validate()?;
    let route = db::routes::create_route(&state.db, auth_user.id, &body).await?;
    tracing::info!(user_id = %auth_user.id, route_id = %route.id, "Route saved");
    Ok(Json(route))
}

pub async fn list_routes(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Route>>> {
    Ok(Json(db::routes::list_routes(&state.db, auth_user.id).await?))
}

pub async fn get_route(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(route_id): Path<Uuid>,
) -> AppResult<Json<Route>> {
    let route = db::routes::get_route(&state.db, auth_user.id, route_id)
        .await?
        .ok_or(AppError::NotFound("Route not found".into()))?;
    Ok(Json(route))
}
