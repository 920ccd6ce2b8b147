use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::run::{NewRating, NewRun, Question, Rating, Run};

/// Writes a run and all of its answers, or nothing at all.
pub async fn create_run_with_ratings(
    db: &SqlitePool,
    user_id: Uuid,
    run: &NewRun,
    ratings: &[NewRating],
) -> Result<Run, sqlx::Error> {
    let mut tx = db.begin().await?;

    let created = sqlx::query_as::<_, Run>(
        r#"
        INSERT INTO runs (id, user_id, date_run, zipcode, approx_dist, approx_time, route_id, commit_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(run.date_run)
    .bind(&run.zipcode)
    .bind(run.approx_dist)
    .bind(run.approx_time)
    .bind(run.route_id)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    for rating in ratings {
        sqlx::query(
            r#"
            INSERT INTO ratings (id, user_id, run_id, question_id, numeric_ans, select_ans, text_ans)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(created.id)
        .bind(rating.question_id)
        .bind(rating.numeric_ans)
        .bind(&rating.select_ans)
        .bind(&rating.text_ans)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(created)
}

pub async fn get_run(db: &SqlitePool, user_id: Uuid, run_id: Uuid) -> Result<Option<Run>, sqlx::Error> {
    sqlx::query_as::<_, Run>("SELECT * FROM runs WHERE id = ? AND user_id = ?")
        .bind(run_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Most recently logged run, by the time it was submitted.
pub async fn latest_run(db: &SqlitePool, user_id: Uuid) -> Result<Option<Run>, sqlx::Error> {
    sqlx::query_as::<_, Run>(
        "SELECT * FROM runs WHERE user_id = ? ORDER BY commit_date DESC, rowid DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// All runs, newest run date first.
pub async fn list_runs(db: &SqlitePool, user_id: Uuid) -> Result<Vec<Run>, sqlx::Error> {
    sqlx::query_as::<_, Run>(
        "SELECT * FROM runs WHERE user_id = ? ORDER BY date_run DESC, commit_date DESC, rowid DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn runs_after(
    db: &SqlitePool,
    user_id: Uuid,
    after: NaiveDate,
) -> Result<Vec<Run>, sqlx::Error> {
    sqlx::query_as::<_, Run>(
        r#"
        SELECT * FROM runs
        WHERE user_id = ? AND date_run > ?
        ORDER BY date_run DESC, commit_date DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .bind(after)
    .fetch_all(db)
    .await
}

/// Up to `limit` runs, newest run date first.
pub async fn recent_runs(db: &SqlitePool, user_id: Uuid, limit: i64) -> Result<Vec<Run>, sqlx::Error> {
    sqlx::query_as::<_, Run>(
        r#"
        SELECT * FROM runs
        WHERE user_id = ?
        ORDER BY date_run DESC, commit_date DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn ratings_for_run(db: &SqlitePool, run_id: Uuid) -> Result<Vec<Rating>, sqlx::Error> {
    sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE run_id = ? ORDER BY question_id ASC")
        .bind(run_id)
        .fetch_all(db)
        .await
}

/// Answers to one question across the given runs.
pub async fn ratings_for_question(
    db: &SqlitePool,
    runs: &[Run],
    question_id: i64,
) -> Result<Vec<Rating>, sqlx::Error> {
    let mut ratings = Vec::with_capacity(runs.len());
    for run in runs {
        if let Some(rating) = rating_for_question(db, run.id, question_id).await? {
            ratings.push(rating);
        }
    }
    Ok(ratings)
}

pub async fn rating_for_question(
    db: &SqlitePool,
    run_id: Uuid,
    question_id: i64,
) -> Result<Option<Rating>, sqlx::Error> {
    sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE run_id = ? AND question_id = ?")
        .bind(run_id)
        .bind(question_id)
        .fetch_optional(db)
        .await
}

pub async fn list_questions(db: &SqlitePool) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>("SELECT * FROM questions ORDER BY id ASC")
        .fetch_all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, test_user};
    use crate::models::run::{Location, QuestionSlot, RouteType, RunRatingsInput, Terrain};

    fn new_run(day: u32) -> NewRun {
        NewRun {
            date_run: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            zipcode: None,
            approx_dist: day as f64,
            approx_time: 30,
            route_id: None,
        }
    }

    fn answers(mood: i32) -> Vec<NewRating> {
        RunRatingsInput {
            before_mood: mood,
            during_mood: 8,
            after_mood: 6,
            energy: 7,
            feeling: "fine".into(),
            location: Location::Trail,
            terrain: Terrain::Flat,
            route_type: RouteType::Random,
            thoughts: Some("windy".into()),
        }
        .into_ratings()
    }

    #[tokio::test]
    async fn test_run_created_with_nine_ratings() {
        let pool = test_pool().await;
        let user = test_user(&pool, "a@example.com").await;

        let run = create_run_with_ratings(&pool, user.id, &new_run(3), &answers(5))
            .await
            .unwrap();
        let ratings = ratings_for_run(&pool, run.id).await.unwrap();
        assert_eq!(ratings.len(), 9);

        let location = rating_for_question(&pool, run.id, QuestionSlot::Location.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.select_ans.as_deref(), Some("trail"));
    }

    #[tokio::test]
    async fn test_run_creation_is_all_or_nothing() {
        let pool = test_pool().await;
        let user = test_user(&pool, "b@example.com").await;

        let mut ratings = answers(5);
        ratings.push(NewRating {
            question_id: 42,
            numeric_ans: Some(1),
            select_ans: None,
            text_ans: None,
        });

        let result = create_run_with_ratings(&pool, user.id, &new_run(3), &ratings).await;
        assert!(result.is_err());

        let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM runs")
            .fetch_one(&pool)
            .await
            .unwrap();
        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(runs, 0);
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn test_recent_runs_ordering_and_limit() {
        let pool = test_pool().await;
        let user = test_user(&pool, "c@example.com").await;
        for day in [2, 9, 5] {
            create_run_with_ratings(&pool, user.id, &new_run(day), &answers(4))
                .await
                .unwrap();
        }

        let recent = recent_runs(&pool, user.id, 5).await.unwrap();
        let days: Vec<f64> = recent.iter().map(|r| r.approx_dist).collect();
        assert_eq!(days, vec![9.0, 5.0, 2.0]);

        let two = recent_runs(&pool, user.id, 2).await.unwrap();
        assert_eq!(two.len(), 2);

        let after = runs_after(&pool, user.id, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap())
            .await
            .unwrap();
        assert_eq!(after.len(), 2);

        let latest = latest_run(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(latest.approx_dist, 5.0);
    }

    #[tokio::test]
    async fn test_runs_are_scoped_to_owner() {
        let pool = test_pool().await;
        let owner = test_user(&pool, "d@example.com").await;
        let other = test_user(&pool, "e@example.com").await;
        let run = create_run_with_ratings(&pool, owner.id, &new_run(1), &answers(4))
            .await
            .unwrap();

        assert!(get_run(&pool, other.id, run.id).await.unwrap().is_none());
        assert!(list_runs(&pool, other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_questions_seeded() {
        let pool = test_pool().await;
        let questions = list_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 9);
        assert_eq!(questions[3].maximum, Some(10));
    }
}
