pub mod planner;
pub mod race_search;
pub mod scoring;
