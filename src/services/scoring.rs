use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::run::{MoodPoint, QuestionSlot, Rating, Run};

pub const DURING_WEIGHT: f64 = 0.50;
pub const AFTER_WEIGHT: f64 = 0.20;
pub const ENERGY_WEIGHT: f64 = 0.30;

/// Numeric answer for `slot` among a run's ratings.
pub fn numeric_answer(run_id: Uuid, ratings: &[Rating], slot: QuestionSlot) -> AppResult<i32> {
    ratings
        .iter()
        .find(|r| r.run_id == run_id && r.question_id == slot.id())
        .and_then(|r| r.numeric_ans)
        .ok_or(AppError::MissingRating {
            run_id,
            question_id: slot.id(),
        })
}

pub fn weighted_score(during: i32, after: i32, energy: i32) -> f64 {
    DURING_WEIGHT * during as f64 + AFTER_WEIGHT * after as f64 + ENERGY_WEIGHT * energy as f64
}

/// Quality score of a run from how it felt during, after, and how much
/// energy the runner had.
pub fn score(run_id: Uuid, ratings: &[Rating]) -> AppResult<f64> {
    let during = numeric_answer(run_id, ratings, QuestionSlot::DuringMood)?;
    let after = numeric_answer(run_id, ratings, QuestionSlot::AfterMood)?;
    let energy = numeric_answer(run_id, ratings, QuestionSlot::Energy)?;
    Ok(weighted_score(during, after, energy))
}

/// Pairs each run with its answer for `slot`, keeping the order of `runs`.
pub fn mood_trend(runs: &[Run], ratings: &[Rating], slot: QuestionSlot) -> AppResult<Vec<MoodPoint>> {
    runs.iter()
        .map(|run| {
            Ok(MoodPoint {
                run_id: run.id,
                date_run: run.date_run,
                rating: numeric_answer(run.id, ratings, slot)?,
                distance: run.approx_dist,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn rating(run_id: Uuid, slot: QuestionSlot, value: i32) -> Rating {
        Rating {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            run_id,
            question_id: slot.id(),
            numeric_ans: Some(value),
            select_ans: None,
            text_ans: None,
        }
    }

    fn run(day: u32, distance: f64) -> Run {
        Run {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date_run: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            zipcode: None,
            approx_dist: distance,
            approx_time: 30,
            route_id: None,
            commit_date: Utc::now(),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((DURING_WEIGHT + AFTER_WEIGHT + ENERGY_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_weighted_sum() {
        let id = Uuid::new_v4();
        let ratings = vec![
            rating(id, QuestionSlot::BeforeMood, 2),
            rating(id, QuestionSlot::DuringMood, 8),
            rating(id, QuestionSlot::AfterMood, 6),
            rating(id, QuestionSlot::Energy, 7),
        ];
        let value = score(id, &ratings).unwrap();
        assert!((value - 7.3).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn test_score_missing_energy() {
        let id = Uuid::new_v4();
        let ratings = vec![
            rating(id, QuestionSlot::DuringMood, 8),
            rating(id, QuestionSlot::AfterMood, 6),
        ];
        let err = score(id, &ratings).unwrap_err();
        assert!(matches!(err, AppError::MissingRating { question_id: 4, .. }));
    }

    #[test]
    fn test_score_ignores_other_runs() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let ratings = vec![
            rating(other, QuestionSlot::DuringMood, 8),
            rating(other, QuestionSlot::AfterMood, 6),
            rating(other, QuestionSlot::Energy, 7),
        ];
        assert!(score(id, &ratings).is_err());
    }

    #[test]
    fn test_mood_trend_keeps_run_order() {
        let newer = run(20, 5.0);
        let older = run(10, 3.1);
        let ratings = vec![
            rating(older.id, QuestionSlot::AfterMood, 4),
            rating(newer.id, QuestionSlot::AfterMood, 9),
        ];
        let points = mood_trend(&[newer.clone(), older.clone()], &ratings, QuestionSlot::AfterMood)
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].run_id, newer.id);
        assert_eq!(points[0].rating, 9);
        assert_eq!(points[1].distance, 3.1);
    }

    #[test]
    fn test_mood_trend_empty() {
        assert!(mood_trend(&[], &[], QuestionSlot::BeforeMood).unwrap().is_empty());
    }
}
