use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::goal::{
    CompleteSubgoalRequest, CreateGoalRequest, Goal, GoalPlan, GoalWithSubgoals, NewGoal,
    PlanQuery, ScheduleSubgoalRequest, Subgoal,
};
use crate::models::goal_kind::GoalKind;
use crate::services::planner;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OutstandingQuery {
    pub goal_id: Option<Uuid>,
}

/// Lead-time window and milestones for a prospective goal, without saving it.
pub async fn plan_goal(Query(query): Query<PlanQuery>) -> AppResult<Json<GoalPlan>> {
    let goal_kind: GoalKind = query.goal_kind.parse()?;
    let range =
        planner::determine_date_range(goal_kind, query.fitness_level, query.run_length_history)?;
    let (start_date, end_date) = range.dates_from(Utc::now().date_naive());

    Ok(Json(GoalPlan {
        goal_kind,
        description: goal_kind.label(),
        min_weeks: range.min_weeks,
        max_weeks: range.max_weeks,
        start_date,
        end_date,
        subgoals: planner::subgoals_for(goal_kind),
    }))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateGoalRequest>,
) -> AppResult<Json<GoalWithSubgoals>> {
    body.validate()?;
    let goal_kind: GoalKind = body.goal_kind.parse()?;
    let range =
        planner::determine_date_range(goal_kind, body.fitness_level, body.run_length_history)?;

    // A linked race has to fall inside the window it was searched in
    if let Some(event_date) = body.event_date {
        let (start_date, end_date) = range.dates_from(Utc::now().date_naive());
        if event_date < start_date || event_date > end_date {
            return Err(AppError::Validation(format!(
                "Event date must fall between {} and {}",
                start_date, end_date
            )));
        }
    }

    let new_goal = NewGoal {
        goal_kind,
        fitness_level: body.fitness_level,
        run_length_history: body.run_length_history,
        zipcode: body.zipcode,
        race_url: body.race_url,
        event_date: body.event_date,
        id_for_api: body.id_for_api,
    };
    let created = db::goals::create_goal_with_subgoals(
        &state.db,
        auth_user.id,
        &new_goal,
        &planner::subgoal_drafts(goal_kind),
    )
    .await?;

    tracing::info!(
        user_id = %auth_user.id,
        goal_id = %created.goal.id,
        goal_kind = %goal_kind,
        subgoals = created.subgoals.len(),
        "Goal created"
    );

    Ok(Json(created))
}

pub async fn list_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Goal>>> {
    Ok(Json(db::goals::list_goals(&state.db, auth_user.id).await?))
}

pub async fn latest_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<GoalWithSubgoals>> {
    let goal = db::goals::latest_goal(&state.db, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("No goals set yet".into()))?;
    let subgoals = db::goals::subgoals_for_goal(&state.db, goal.id).await?;
    Ok(Json(GoalWithSubgoals { goal, subgoals }))
}

pub async fn get_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<GoalWithSubgoals>> {
    let goal = db::goals::get_goal(&state.db, auth_user.id, goal_id)
        .await?
        .ok_or(AppError::NotFound("Goal not found".into()))?;
    let subgoals = db::goals::subgoals_for_goal(&state.db, goal.id).await?;
    Ok(Json(GoalWithSubgoals { goal, subgoals }))
}

pub async fn complete_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<Goal>> {
    let goal = db::goals::complete_goal(&state.db, auth_user.id, goal_id)
        .await?
        .ok_or(AppError::NotFound("Goal not found".into()))?;
    tracing::info!(user_id = %auth_user.id, goal_id = %goal.id, "Goal completed");
    Ok(Json(goal))
}

pub async fn outstanding_subgoals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<OutstandingQuery>,
) -> AppResult<Json<Vec<Subgoal>>> {
    Ok(Json(
        db::goals::outstanding_subgoals(&state.db, auth_user.id, query.goal_id).await?,
    ))
}

async fn owned_subgoal(state: &AppState, user_id: Uuid, subgoal_id: Uuid) -> AppResult<Subgoal> {
    db::goals::get_subgoal(&state.db, user_id, subgoal_id)
        .await?
        .ok_or(AppError::NotFound("Subgoal not found".into()))
}

pub async fn schedule_subgoal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(subgoal_id): Path<Uuid>,
    Json(body): Json<ScheduleSubgoalRequest>,
) -> AppResult<Json<Subgoal>> {
    let subgoal = owned_subgoal(&state, auth_user.id, subgoal_id).await?;
    Ok(Json(
        db::goals::schedule_subgoal(&state.db, subgoal.id, body.date).await?,
    ))
}

pub async fn complete_subgoal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(subgoal_id): Path<Uuid>,
    Json(body): Json<CompleteSubgoalRequest>,
) -> AppResult<Json<Subgoal>> {
    let subgoal = owned_subgoal(&state, auth_user.id, subgoal_id).await?;

    if let Some(run_id) = body.run_id {
        db::runs::get_run(&state.db, auth_user.id, run_id)
            .await?
            .ok_or(AppError::NotFound("Run not found".into()))?;
    }

    let completed = db::goals::complete_subgoal(&state.db, subgoal.id, body.run_id).await?;
    tracing::info!(user_id = %auth_user.id, subgoal_id = %completed.id, "Subgoal completed");
    Ok(Json(completed))
}
