use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::goal_kind::GoalKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal_kind: GoalKind,
    pub description: String,
    pub fitness_level: i32,
    pub run_length_history: i32,
    pub set_date: DateTime<Utc>,
    pub zipcode: Option<String>,
    pub race_url: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub id_for_api: Option<String>,
    pub date_completed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subgoal {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub position: i32,
    pub goal_kind: GoalKind,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub date_completed: Option<DateTime<Utc>>,
    pub associated_run_id: Option<Uuid>,
}

/// A subgoal row before it has been written.
#[derive(Debug, Clone, PartialEq)]
pub struct SubgoalDraft {
    pub goal_kind: GoalKind,
    pub description: String,
}

/// A goal row before it has been written.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub goal_kind: GoalKind,
    pub fitness_level: i32,
    pub run_length_history: i32,
    pub zipcode: Option<String>,
    pub race_url: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub id_for_api: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    pub goal_kind: String,
    #[validate(range(min = 1, max = 3, message = "Fitness level must be between 1 and 3"))]
    pub fitness_level: i32,
    #[validate(range(min = 1, max = 3, message = "Run length history must be between 1 and 3"))]
    pub run_length_history: i32,
    #[validate(length(max = 15, message = "Zipcode too long"))]
    pub zipcode: Option<String>,
    #[validate(url(message = "Race URL must be a valid URL"))]
    pub race_url: Option<String>,
    pub event_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub id_for_api: Option<String>,
}

/// Query string shared by the plan preview and the race search.
#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub goal_kind: String,
    pub fitness_level: i32,
    pub run_length_history: i32,
    pub zipcode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoalPlan {
    pub goal_kind: GoalKind,
    pub description: &'static str,
    pub min_weeks: u32,
    pub max_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub subgoals: Vec<GoalKind>,
}

#[derive(Debug, Serialize)]
pub struct GoalWithSubgoals {
    #[serde(flatten)]
    pub goal: Goal,
    pub subgoals: Vec<Subgoal>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleSubgoalRequest {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteSubgoalRequest {
    pub run_id: Option<Uuid>,
}
