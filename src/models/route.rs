use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub location_description: Option<String>,
    pub notes: Option<String>,
    pub distance: Option<f64>,
    pub html_embed: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouteRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 500))]
    pub location_description: Option<String>,
    pub notes: Option<String>,
    #[validate(range(min = 0.0, max = 500.0))]
    pub distance: Option<f64>,
    #[validate(length(min = 1, message = "Map embed is required"))]
    pub html_embed: String,
}
