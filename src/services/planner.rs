//! Goal planning: how far out to look for a race, and which milestones lead
//! up to it.

use chrono::{Duration, NaiveDate};

use crate::error::{AppError, AppResult};
use crate::models::goal::SubgoalDraft;
use crate::models::goal_kind::GoalKind;

/// Self-reported ordinals run from 1 (least) to 3 (most).
pub const LEVEL_MIN: i32 = 1;
pub const LEVEL_MAX: i32 = 3;

/// Width of the search window past the minimum lead time.
const SEARCH_WINDOW_WEEKS: u32 = 12;
const MAX_LEAD_WEEKS: u32 = 52;

/// Minimum lead time for an unprepared runner, by longest distance in miles.
const LEAD_TIME_TIERS: [(u32, u32); 4] = [(1, 2), (3, 4), (6, 6), (10, 10)];
const LONGEST_TIER_WEEKS: u32 = 14;

/// Highest combined preparedness: both ordinals at LEVEL_MAX.
const PREPAREDNESS_SPAN: u32 = ((LEVEL_MAX - LEVEL_MIN) * 2) as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub min_weeks: u32,
    pub max_weeks: u32,
}

impl WeekRange {
    /// Calendar dates the window covers, counted from `today`.
    pub fn dates_from(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            today + Duration::weeks(self.min_weeks as i64),
            today + Duration::weeks(self.max_weeks as i64),
        )
    }
}

fn check_level(name: &str, value: i32) -> AppResult<u32> {
    if !(LEVEL_MIN..=LEVEL_MAX).contains(&value) {
        return Err(AppError::Validation(format!(
            "{name} must be between {LEVEL_MIN} and {LEVEL_MAX}"
        )));
    }
    Ok((value - LEVEL_MIN) as u32)
}

fn base_lead_weeks(distance_miles: u32) -> u32 {
    LEAD_TIME_TIERS
        .iter()
        .find(|(max_miles, _)| distance_miles <= *max_miles)
        .map(|(_, weeks)| *weeks)
        .unwrap_or(LONGEST_TIER_WEEKS)
}

/// Week offsets from today bounding the search for a matching race.
///
/// Lead time grows with the goal's distance and shrinks as fitness and
/// running history improve. Both bounds are inclusive.
pub fn determine_date_range(
    goal_kind: GoalKind,
    fitness_level: i32,
    run_length_history: i32,
) -> AppResult<WeekRange> {
    let fitness = check_level("fitness_level", fitness_level)?;
    let history = check_level("run_length_history", run_length_history)?;

    let base = base_lead_weeks(goal_kind.distance_miles());
    let remaining = PREPAREDNESS_SPAN + 2 - (fitness + history);
    // ceil(base * remaining / (span + 2))
    let scaled = (base * remaining).div_ceil(PREPAREDNESS_SPAN + 2);

    let min_weeks = scaled.max(1);
    let max_weeks = (min_weeks + SEARCH_WINDOW_WEEKS).min(MAX_LEAD_WEEKS);

    Ok(WeekRange {
        min_weeks,
        max_weeks,
    })
}

/// Prerequisite goal kinds for `goal_kind`, easiest first.
pub fn subgoals_for(goal_kind: GoalKind) -> Vec<GoalKind> {
    goal_kind.prerequisites().to_vec()
}

/// Subgoal rows to persist with a new goal. Target dates are left for the
/// runner to set.
pub fn subgoal_drafts(goal_kind: GoalKind) -> Vec<SubgoalDraft> {
    subgoals_for(goal_kind)
        .into_iter()
        .map(|kind| SubgoalDraft {
            goal_kind: kind,
            description: kind.label().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_for_every_input() {
        for kind in GoalKind::ALL {
            for fitness in LEVEL_MIN..=LEVEL_MAX {
                for history in LEVEL_MIN..=LEVEL_MAX {
                    let range = determine_date_range(kind, fitness, history).unwrap();
                    assert!(range.min_weeks >= 1, "{kind} {fitness} {history}");
                    assert!(range.min_weeks <= range.max_weeks);
                    assert!(range.max_weeks <= MAX_LEAD_WEEKS);
                }
            }
        }
    }

    #[test]
    fn test_more_prepared_never_waits_longer() {
        for kind in GoalKind::ALL {
            for fitness in LEVEL_MIN..LEVEL_MAX {
                for history in LEVEL_MIN..=LEVEL_MAX {
                    let lower = determine_date_range(kind, fitness, history).unwrap();
                    let higher = determine_date_range(kind, fitness + 1, history).unwrap();
                    assert!(higher.min_weeks <= lower.min_weeks);

                    let lower = determine_date_range(kind, history, fitness).unwrap();
                    let higher = determine_date_range(kind, history, fitness + 1).unwrap();
                    assert!(higher.min_weeks <= lower.min_weeks);
                }
            }
        }
    }

    #[test]
    fn test_longer_goals_never_start_sooner() {
        for a in GoalKind::ALL {
            for b in GoalKind::ALL {
                if a.distance_miles() > b.distance_miles() {
                    continue;
                }
                for fitness in LEVEL_MIN..=LEVEL_MAX {
                    for history in LEVEL_MIN..=LEVEL_MAX {
                        let shorter = determine_date_range(a, fitness, history).unwrap();
                        let longer = determine_date_range(b, fitness, history).unwrap();
                        assert!(longer.min_weeks >= shorter.min_weeks, "{a} vs {b}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_known_ranges() {
        let beginner_half = determine_date_range(GoalKind::RunHalf, 1, 1).unwrap();
        assert_eq!(beginner_half, WeekRange { min_weeks: 14, max_weeks: 26 });

        let seasoned_5k = determine_date_range(GoalKind::Run5k, 3, 3).unwrap();
        assert_eq!(seasoned_5k, WeekRange { min_weeks: 2, max_weeks: 14 });

        let mile = determine_date_range(GoalKind::RunWalk1Mile, 3, 3).unwrap();
        assert_eq!(mile.min_weeks, 1);
    }

    #[test]
    fn test_out_of_range_levels_rejected() {
        assert!(matches!(
            determine_date_range(GoalKind::Run10k, 0, 2),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            determine_date_range(GoalKind::Run10k, 2, 4),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_dates_from_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let range = WeekRange { min_weeks: 2, max_weeks: 4 };
        let (from, to) = range.dates_from(today);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 3, 29).unwrap());
    }

    #[test]
    fn test_subgoals_never_reference_goal() {
        for kind in GoalKind::ALL {
            let subgoals = subgoals_for(kind);
            assert!(!subgoals.contains(&kind));
            assert_eq!(subgoals, subgoals_for(kind));
        }
    }

    #[test]
    fn test_subgoal_chains() {
        assert_eq!(
            subgoals_for(GoalKind::RunWalk5k),
            vec![GoalKind::RunWalk1Mile, GoalKind::RunWalk2Miles]
        );
        assert_eq!(subgoals_for(GoalKind::RunHalf).len(), 6);
        assert!(subgoals_for(GoalKind::Run2Miles).is_empty());
    }

    #[test]
    fn test_subgoal_drafts_use_labels() {
        let drafts = subgoal_drafts(GoalKind::RunWalk10k);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].description, "Run/Walk 5k");
        assert_eq!(drafts[1].goal_kind, GoalKind::RunWalk5Miles);
    }
}
