//! Ranking History Use Case

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::RankingConfig;
use crate::domain::entity::UserRanking;
use crate::domain::repository::{UserRankingRepository, UserRepository};
use crate::domain::value_object::Period;
use crate::error::{RankingError, RankingResult};

/// A user's snapshot rows for one period, newest first
pub struct RankingHistoryUseCase<U, K>
where
    U: UserRepository,
    K: UserRankingRepository,
{
    user_repo: Arc<U>,
    ranking_repo: Arc<K>,
    config: Arc<RankingConfig>,
}

impl<U, K> RankingHistoryUseCase<U, K>
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

    pub async fn execute(
        &self,
        user_id: UserId,
        period: Period,
        limit: Option<u32>,
    ) -> RankingResult<Vec<UserRanking>> {
        let limit = self.config.resolve_limit(limit)?;

        if self.user_repo.find_by_id(&user_id).await?.is_none() {
            return Err(RankingError::UserNotFound);
        }

        self.ranking_repo
            .history_for_user(&user_id, period, limit)
            .await
    }
}
