use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::run::{
    Location, LocationPoint, MoodMoment, MoodPoint, QuestionSlot, RunSummary, TrendQuery,
};
use crate::services::scoring;
use crate::AppState;

const DEFAULT_TREND_RUNS: i64 = 5;
const MAX_TREND_RUNS: i64 = 100;

fn trend_count(query: &TrendQuery) -> AppResult<i64> {
    let count = query.count.unwrap_or(DEFAULT_TREND_RUNS);
    if !(1..=MAX_TREND_RUNS).contains(&count) {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {}",
            MAX_TREND_RUNS
        )));
    }
    Ok(count)
}

/// Mood at one moment of each of the latest runs, with the run's distance.
pub async fn mood_trend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<Vec<MoodPoint>>> {
    let count = trend_count(&query)?;
    let slot = query.moment.unwrap_or(MoodMoment::Before).slot();

    let runs = db::runs::recent_runs(&state.db, auth_user.id, count).await?;
    let ratings = db::runs::ratings_for_question(&state.db, &runs, slot.id()).await?;

    Ok(Json(scoring::mood_trend(&runs, &ratings, slot)?))
}

/// Date, distance and score of the latest runs.
pub async fn run_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<Vec<RunSummary>>> {
    let count = trend_count(&query)?;
    let runs = db::runs::recent_runs(&state.db, auth_user.id, count).await?;

    let mut summaries = Vec::with_capacity(runs.len());
    for run in runs {
        let ratings = db::runs::ratings_for_run(&state.db, run.id).await?;
        summaries.push(RunSummary {
            run_id: run.id,
            date_run: run.date_run,
            distance: run.approx_dist,
            score: scoring::score(run.id, &ratings)?,
        });
    }

    Ok(Json(summaries))
}

/// Where each of the latest runs took place.
pub async fn location_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<Vec<LocationPoint>>> {
    let count = trend_count(&query)?;
    let runs = db::runs::recent_runs(&state.db, auth_user.id, count).await?;

    let mut points = Vec::with_capacity(runs.len());
    for run in runs {
        let rating = db::runs::rating_for_question(&state.db, run.id, QuestionSlot::Location.id())
            .await?
            .ok_or(AppError::MissingRating {
                run_id: run.id,
                question_id: QuestionSlot::Location.id(),
            })?;
        let location = rating.select_ans.unwrap_or_default();
        points.push(LocationPoint {
            run_id: run.id,
            date_run: run.date_run,
            label: Location::parse(&location).map(Location::label),
            location,
        });
    }

    Ok(Json(points))
}
