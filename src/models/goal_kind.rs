use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The fixed vocabulary of training goals a runner can pick from.
///
/// Race goals (5k, 10k, half marathon) can be matched against real events;
/// the mile-based kinds are training milestones used as subgoals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
pub enum GoalKind {
    #[sqlx(rename = "run_walk_5k")]
    #[serde(rename = "run_walk_5k")]
    RunWalk5k,
    #[sqlx(rename = "run_5k")]
    #[serde(rename = "run_5k")]
    Run5k,
    #[sqlx(rename = "run_walk_10k")]
    #[serde(rename = "run_walk_10k")]
    RunWalk10k,
    #[sqlx(rename = "run_10k")]
    #[serde(rename = "run_10k")]
    Run10k,
    #[sqlx(rename = "run_walk_half")]
    #[serde(rename = "run_walk_half")]
    RunWalkHalf,
    #[sqlx(rename = "run_half")]
    #[serde(rename = "run_half")]
    RunHalf,
    #[sqlx(rename = "run_walk_1_mile")]
    #[serde(rename = "run_walk_1_mile")]
    RunWalk1Mile,
    #[sqlx(rename = "run_walk_2_miles")]
    #[serde(rename = "run_walk_2_miles")]
    RunWalk2Miles,
    #[sqlx(rename = "run_walk_3_miles")]
    #[serde(rename = "run_walk_3_miles")]
    RunWalk3Miles,
    #[sqlx(rename = "run_2_miles")]
    #[serde(rename = "run_2_miles")]
    Run2Miles,
    #[sqlx(rename = "run_walk_5_miles")]
    #[serde(rename = "run_walk_5_miles")]
    RunWalk5Miles,
    #[sqlx(rename = "run_5_miles")]
    #[serde(rename = "run_5_miles")]
    Run5Miles,
    #[sqlx(rename = "run_walk_10_miles")]
    #[serde(rename = "run_walk_10_miles")]
    RunWalk10Miles,
    #[sqlx(rename = "run_10_miles")]
    #[serde(rename = "run_10_miles")]
    Run10Miles,
}

impl GoalKind {
    pub const ALL: [GoalKind; 14] = [
        GoalKind::RunWalk5k,
        GoalKind::Run5k,
        GoalKind::RunWalk10k,
        GoalKind::Run10k,
        GoalKind::RunWalkHalf,
        GoalKind::RunHalf,
        GoalKind::RunWalk1Mile,
        GoalKind::RunWalk2Miles,
        GoalKind::RunWalk3Miles,
        GoalKind::Run2Miles,
        GoalKind::RunWalk5Miles,
        GoalKind::Run5Miles,
        GoalKind::RunWalk10Miles,
        GoalKind::Run10Miles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GoalKind::RunWalk5k => "run_walk_5k",
            GoalKind::Run5k => "run_5k",
            GoalKind::RunWalk10k => "run_walk_10k",
            GoalKind::Run10k => "run_10k",
            GoalKind::RunWalkHalf => "run_walk_half",
            GoalKind::RunHalf => "run_half",
            GoalKind::RunWalk1Mile => "run_walk_1_mile",
            GoalKind::RunWalk2Miles => "run_walk_2_miles",
            GoalKind::RunWalk3Miles => "run_walk_3_miles",
            GoalKind::Run2Miles => "run_2_miles",
            GoalKind::RunWalk5Miles => "run_walk_5_miles",
            GoalKind::Run5Miles => "run_5_miles",
            GoalKind::RunWalk10Miles => "run_walk_10_miles",
            GoalKind::Run10Miles => "run_10_miles",
        }
    }

    /// Display label, also used as the description of materialized subgoals.
    pub fn label(self) -> &'static str {
        match self {
            GoalKind::RunWalk5k => "Run/Walk 5k",
            GoalKind::Run5k => "Run 5k",
            GoalKind::RunWalk10k => "Run/Walk 10k",
            GoalKind::Run10k => "Run 10k",
            GoalKind::RunWalkHalf => "Run/Walk Half Marathon (13.1 Miles)",
            GoalKind::RunHalf => "Run Half Marathon (13.1 Miles)",
            GoalKind::RunWalk1Mile => "Run/Walk 1 mile",
            GoalKind::RunWalk2Miles => "Run/Walk 2 miles",
            GoalKind::RunWalk3Miles => "Run/Walk 3 miles",
            GoalKind::Run2Miles => "Run 2 miles",
            GoalKind::RunWalk5Miles => "Run/Walk 5 miles",
            GoalKind::Run5Miles => "Run 5 miles",
            GoalKind::RunWalk10Miles => "Run/Walk 10 miles",
            GoalKind::Run10Miles => "Run 10 miles",
        }
    }

    /// Canonical distance in whole miles.
    pub fn distance_miles(self) -> u32 {
        match self {
            GoalKind::RunWalk1Mile => 1,
            GoalKind::RunWalk2Miles | GoalKind::Run2Miles => 2,
            GoalKind::RunWalk5k | GoalKind::Run5k | GoalKind::RunWalk3Miles => 3,
            GoalKind::RunWalk5Miles | GoalKind::Run5Miles => 5,
            GoalKind::RunWalk10k | GoalKind::Run10k => 6,
            GoalKind::RunWalk10Miles | GoalKind::Run10Miles => 10,
            GoalKind::RunWalkHalf | GoalKind::RunHalf => 13,
        }
    }

    /// Distance facet understood by the race search provider. Only race
    /// distances have one.
    pub fn race_distance_facet(self) -> Option<&'static str> {
        match self {
            GoalKind::RunWalk5k | GoalKind::Run5k => Some("Distance (running):5k"),
            GoalKind::RunWalk10k | GoalKind::Run10k => Some("Distance (running):10k"),
            GoalKind::RunWalkHalf | GoalKind::RunHalf => {
                Some("Distance (running):half marathon")
            }
            _ => None,
        }
    }

    /// Prerequisite milestones, easiest first. Training distances are terminal.
    pub fn prerequisites(self) -> &'static [GoalKind] {
        use GoalKind::*;
        match self {
            RunWalk5k => &[RunWalk1Mile, RunWalk2Miles],
            Run5k => &[RunWalk1Mile, RunWalk2Miles, RunWalk3Miles, Run2Miles],
            RunWalk10k => &[RunWalk5k, RunWalk5Miles],
            Run10k => &[RunWalk5k, Run5k, RunWalk10k, Run5Miles],
            RunWalkHalf => &[RunWalk5k, RunWalk10k, RunWalk10Miles],
            RunHalf => &[RunWalk5k, RunWalk10k, Run5k, Run10k, RunWalk10Miles, Run10Miles],
            _ => &[],
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoalKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::UnknownGoalKind(s.to_string()))
    }
}
