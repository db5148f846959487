//! YouTube channel subscriber rankings and growth service
//!
//! - REST API endpoints in `endpoints/`
//! - PostgreSQL models and queries in `db/`, behind the `Store` trait
//! - Growth, ranking and ingestion logic in `services/`
//! - Periodic jobs in `scheduler`
//! - Requires YOUTUBE_API_KEY env var for API access

pub mod config;
pub mod db;
pub mod endpoints;
pub mod scheduler;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
