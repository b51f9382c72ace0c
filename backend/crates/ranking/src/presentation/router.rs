//! Ranking Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::application::config::RankingConfig;
use crate::domain::repository::RankingRepository;
use crate::infra::postgres::PgRankingRepository;
use crate::presentation::handlers::{self, RankingAppState};

/// Create the ranking router with PostgreSQL repository
pub fn ranking_router(repo: PgRankingRepository, config: RankingConfig) -> Router {
    ranking_router_generic(repo, config)
}

/// Create a generic ranking router for any repository implementation
pub fn ranking_router_generic<R>(repo: R, config: RankingConfig) -> Router
where
    R: RankingRepository + Clone + Send + 'static,
{
    let state = RankingAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/leaderboard", get(handlers::global_leaderboard::<R>))
        .route(
            "/leaderboard/extended",
            get(handlers::extended_leaderboard::<R>),
        )
        .route(
            "/leaderboard/lessons/{lesson_id}",
            get(handlers::lesson_leaderboard::<R>),
        )
        .route(
            "/leaderboard/rankings/{period}",
            post(handlers::update_rankings::<R>),
        )
        .route("/users", post(handlers::register_user::<R>))
        .route("/users/{user_id}", patch(handlers::update_profile::<R>))
        .route(
            "/users/by-name/{user_name}",
            get(handlers::user_profile::<R>),
        )
        .route("/users/{user_id}/stats", get(handlers::user_stats::<R>))
        .route(
            "/users/{user_id}/rankings",
            get(handlers::ranking_history::<R>),
        )
        .route("/lessons", get(handlers::list_lesson_levels::<R>))
        .route("/lessons/types", get(handlers::list_lesson_types::<R>))
        .route("/lessons/{lesson_id}", get(handlers::get_lesson::<R>))
        .route(
            "/lessons/{lesson_id}/complete",
            post(handlers::complete_lesson::<R>),
        )
        .with_state(state)
}
