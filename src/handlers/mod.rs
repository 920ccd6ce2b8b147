pub mod auth;
pub mod goals;
pub mod health;
pub mod races;
pub mod routes;
pub mod runs;
pub mod stats;
