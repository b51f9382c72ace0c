//! Global Leaderboard Use Case
//!
//! Top users by experience, annotated with their trend against the latest
//! snapshot batch whose period has already ended.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::RankingConfig;
use crate::domain::entity::LeaderboardEntry;
use crate::domain::repository::{UserRankingRepository, UserRepository};
use crate::domain::services;
use crate::error::RankingResult;

pub struct GlobalLeaderboardUseCase<U, K>
where
    U: UserRepository,
    K: UserRankingRepository,
{
    user_repo: Arc<U>,
    ranking_repo: Arc<K>,
    config: Arc<RankingConfig>,
}

impl<U, K> GlobalLeaderboardUseCase<U, K>
where
    U: UserRepository,
    K: UserRankingRepository,
{
    pub fn new(user_repo: Arc<U>, ranking_repo: Arc<K>, config: Arc<RankingConfig>) -> Self {
        Self {
            user_repo,
            ranking_repo,
            config,
        }
    }

    pub async fn execute(&self, limit: Option<u32>) -> RankingResult<Vec<LeaderboardEntry>> {
        let limit = self.config.resolve_limit(limit)?;

        let users = self.user_repo.top_by_experience(limit).await?;
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let previous = self
            .ranking_repo
            .latest_before(self.config.trend_period, Utc::now())
            .await?;

        tracing::debug!(
            limit,
            users = users.len(),
            previous = previous.len(),
            "Computed global leaderboard"
        );

        Ok(services::rank_global(users, &previous))
    }
}
