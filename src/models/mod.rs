pub mod goal;
pub mod goal_kind;
pub mod route;
pub mod run;
pub mod user;
