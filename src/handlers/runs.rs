use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::run::{CreateRunRequest, Question, Run, RunDetail, RunQuery};
use crate::services::scoring;
use crate::AppState;

pub async fn list_questions(State(state): State<AppState>) -> AppResult<Json<Vec<Question>>> {
    Ok(Json(db::runs::list_questions(&state.db).await?))
}

pub async fn create_run(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateRunRequest>,
) -> AppResult<Json<RunDetail>> {
    body.validate()?;
    body.ratings.validate()?;

    if let Some(route_id) = body.route_id {
        db::routes::get_route(&state.db, auth_user.id, route_id)
            .await?
            .ok_or(AppError::NotFound("Route not found".into()))?;
    }

    let (new_run, answers) = body.into_parts();
    let run = db::runs::create_run_with_ratings(&state.db, auth_user.id, &new_run, &answers).await?;
    let ratings = db::runs::ratings_for_run(&state.db, run.id).await?;
    let score = scoring::score(run.id, &ratings)?;

    tracing::info!(user_id = %auth_user.id, run_id = %run.id, score, "Run logged");

    Ok(Json(RunDetail {
        run,
        ratings,
        score: Some(score),
    }))
}

pub async fn list_runs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RunQuery>,
) -> AppResult<Json<Vec<Run>>> {
    let runs = match query.after {
        Some(after) => db::runs::runs_after(&state.db, auth_user.id, after).await?,
        None => db::runs::list_runs(&state.db, auth_user.id).await?,
    };
    Ok(Json(runs))
}

async fn run_detail(state: &AppState, run: Run) -> AppResult<RunDetail> {
    let ratings = db::runs::ratings_for_run(&state.db, run.id).await?;
    // Runs missing an answer are still shown, just without a score
    let score = scoring::score(run.id, &ratings).ok();
    Ok(RunDetail {
        run,
        ratings,
        score,
    })
}

pub async fn latest_run(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<RunDetail>> {
    let run = db::runs::latest_run(&state.db, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("No runs logged yet".into()))?;
    Ok(Json(run_detail(&state, run).await?))
}

pub async fn get_run(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<RunDetail>> {
    let run = db::runs::get_run(&state.db, auth_user.id, run_id)
        .await?
        .ok_or(AppError::NotFound("Run not found".into()))?;
    Ok(Json(run_detail(&state, run).await?))
}

pub async fn get_run_score(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let run = db::runs::get_run(&state.db, auth_user.id, run_id)
        .await?
        .ok_or(AppError::NotFound("Run not found".into()))?;
    let ratings = db::runs::ratings_for_run(&state.db, run.id).await?;
    let score = scoring::score(run.id, &ratings)?;

    Ok(Json(serde_json::json!({ "run_id": run.id, "score": score })))
}
