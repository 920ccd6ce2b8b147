use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::goal::PlanQuery;
use crate::models::goal_kind::GoalKind;
use crate::services::planner;
use crate::services::race_search::{RaceQuery, RaceResult};
use crate::AppState;

/// Races near the runner that fall inside the goal's lead-time window.
/// Falls back to the profile zipcode when the query omits one.
pub async fn search_races(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<PlanQuery>,
) -> AppResult<Json<Vec<RaceResult>>> {
    let goal_kind: GoalKind = query.goal_kind.parse()?;
    let distance_facet = goal_kind.race_distance_facet().ok_or_else(|| {
        AppError::Validation(format!("{} is a training goal, not a race", goal_kind.label()))
    })?;
    let range =
        planner::determine_date_range(goal_kind, query.fitness_level, query.run_length_history)?;

    let zipcode = match query.zipcode.filter(|z| !z.trim().is_empty()) {
        Some(zipcode) => zipcode,
        None => db::users::find_by_id(&state.db, auth_user.id)
            .await?
            .and_then(|user| user.zipcode)
            .ok_or(AppError::Validation(
                "A zipcode is required to search for races".into(),
            ))?,
    };

    let (from, to) = range.dates_from(Utc::now().date_naive());
    let races = state
        .race_search
        .search(&RaceQuery {
            distance_facet,
            from,
            to,
            zipcode: &zipcode,
        })
        .await?;

    tracing::info!(
        user_id = %auth_user.id,
        goal_kind = %goal_kind,
        found = races.len(),
        "Race search"
    );

    Ok(Json(races))
}
