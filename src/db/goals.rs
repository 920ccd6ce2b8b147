use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::goal::{Goal, GoalWithSubgoals, NewGoal, Subgoal, SubgoalDraft};

/// Writes a goal together with its subgoals, or nothing at all.
pub async fn create_goal_with_subgoals(
    db: &SqlitePool,
    user_id: Uuid,
    goal: &NewGoal,
    drafts: &[SubgoalDraft],
) -> Result<GoalWithSubgoals, sqlx::Error> {
    let mut tx = db.begin().await?;

    let created = sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO goals (
            id, user_id, goal_kind, description, fitness_level, run_length_history,
            set_date, zipcode, race_url, event_date, id_for_api
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(goal.goal_kind)
    .bind(goal.goal_kind.label())
    .bind(goal.fitness_level)
    .bind(goal.run_length_history)
    .bind(Utc::now())
    .bind(&goal.zipcode)
    .bind(&goal.race_url)
    .bind(goal.event_date)
    .bind(&goal.id_for_api)
    .fetch_one(&mut *tx)
    .await?;

    let mut subgoals = Vec::with_capacity(drafts.len());
    for (position, draft) in drafts.iter().enumerate() {
        let subgoal = sqlx::query_as::<_, Subgoal>(
            r#"
            INSERT INTO subgoals (id, goal_id, position, goal_kind, description)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(created.id)
        .bind(position as i32)
        .bind(draft.goal_kind)
        .bind(&draft.description)
        .fetch_one(&mut *tx)
        .await?;
        subgoals.push(subgoal);
    }

    tx.commit().await?;

    Ok(GoalWithSubgoals {
        goal: created,
        subgoals,
    })
}

pub async fn get_goal(db: &SqlitePool, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = ? AND user_id = ?")
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn list_goals(db: &SqlitePool, user_id: Uuid) -> Result<Vec<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = ? ORDER BY set_date DESC, rowid DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn latest_goal(db: &SqlitePool, user_id: Uuid) -> Result<Option<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = ? ORDER BY set_date DESC, rowid DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Marks a goal done. Returns `None` when the goal does not belong to the user.
pub async fn complete_goal(
    db: &SqlitePool,
    user_id: Uuid,
    goal_id: Uuid,
) -> Result<Option<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        r#"
        UPDATE goals SET date_completed = COALESCE(date_completed, ?)
        WHERE id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(Utc::now())
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn subgoals_for_goal(db: &SqlitePool, goal_id: Uuid) -> Result<Vec<Subgoal>, sqlx::Error> {
    sqlx::query_as::<_, Subgoal>("SELECT * FROM subgoals WHERE goal_id = ? ORDER BY position ASC")
        .bind(goal_id)
        .fetch_all(db)
        .await
}

/// Open subgoals across all of the user's goals, or within one goal.
pub async fn outstanding_subgoals(
    db: &SqlitePool,
    user_id: Uuid,
    goal_id: Option<Uuid>,
) -> Result<Vec<Subgoal>, sqlx::Error> {
    sqlx::query_as::<_, Subgoal>(
        r#"
        SELECT s.* FROM subgoals s
        JOIN goals g ON g.id = s.goal_id
        WHERE g.user_id = ? AND s.date_completed IS NULL AND (? IS NULL OR g.id = ?)
        ORDER BY g.set_date DESC, s.position ASC
        "#,
    )
    .bind(user_id)
    .bind(goal_id)
    .bind(goal_id)
    .fetch_all(db)
    .await
}

pub async fn get_subgoal(
    db: &SqlitePool,
    user_id: Uuid,
    subgoal_id: Uuid,
) -> Result<Option<Subgoal>, sqlx::Error> {
    sqlx::query_as::<_, Subgoal>(
        r#"
        SELECT s.* FROM subgoals s
        JOIN goals g ON g.id = s.goal_id
        WHERE s.id = ? AND g.user_id = ?
        "#,
    )
    .bind(subgoal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn schedule_subgoal(
    db: &SqlitePool,
    subgoal_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<Subgoal, sqlx::Error> {
    sqlx::query_as::<_, Subgoal>("UPDATE subgoals SET date = ? WHERE id = ? RETURNING *")
        .bind(date)
        .bind(subgoal_id)
        .fetch_one(db)
        .await
}

pub async fn complete_subgoal(
    db: &SqlitePool,
    subgoal_id: Uuid,
    run_id: Option<Uuid>,
) -> Result<Subgoal, sqlx::Error> {
    sqlx::query_as::<_, Subgoal>(
        r#"
        UPDATE subgoals SET
            date_completed = COALESCE(date_completed, ?),
            associated_run_id = COALESCE(?, associated_run_id)
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(Utc::now())
    .bind(run_id)
    .bind(subgoal_id)
    .fetch_one(db)
    .await
}
