//! User Stats Use Case

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::UserStats;
use crate::domain::repository::{LessonResultRepository, UserRepository};
use crate::error::{RankingError, RankingResult};

pub struct UserStatsUseCase<U, S>
where
    U: UserRepository,
    S: LessonResultRepository,
{
    user_repo: Arc<U>,
    result_repo: Arc<S>,
}

impl<U, S> UserStatsUseCase<U, S>
where
    U: UserRepository,
    S: LessonResultRepository,
{
    pub fn new(user_repo: Arc<U>, result_repo: Arc<S>) -> Self {
        Self {
            user_repo,
            result_repo,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> RankingResult<UserStats> {
        if self.user_repo.find_by_id(&user_id).await?.is_none() {
            return Err(RankingError::UserNotFound);
        }

        let summary = self.result_repo.stats_for_user(&user_id).await?;
        Ok(UserStats::from(summary))
    }
}
