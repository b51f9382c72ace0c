//! Ranking Backend Module
//!
//! Leaderboards, ranking snapshots and lesson completion for the
//! language-learning service.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, ranking rules
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers
//!
//! ## Ranking Model
//! - Global leaderboard: experience descending, ties by user id (UUIDv7, so
//!   earlier registration wins)
//! - Lesson leaderboard: score ascending (elapsed seconds), competition ranks
//! - Trends compare against the latest weekly snapshot whose period has ended
//! - Completion writes (experience increment + result upsert) share one
//!   transaction

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::RankingConfig;
pub use error::{RankingError, RankingResult};
pub use infra::{InMemoryRankingRepository, PgRankingRepository};
pub use presentation::router::{ranking_router, ranking_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
