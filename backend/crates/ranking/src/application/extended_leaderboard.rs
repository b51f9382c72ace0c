//! Extended Leaderboard Use Case
//!
//! The global leaderboard plus lesson activity per user, fetched with one
//! aggregate query for the whole page.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::config::RankingConfig;
use crate::application::global_leaderboard::GlobalLeaderboardUseCase;
use crate::domain::entity::{ExtendedLeaderboardEntry, UserActivity};
use crate::domain::repository::{LessonResultRepository, UserRankingRepository, UserRepository};
use crate::domain::value_object::CompletionTime;
use crate::error::RankingResult;

pub struct ExtendedLeaderboardUseCase<U, K, S>
where
    U: UserRepository,
    K: UserRankingRepository,
    S: LessonResultRepository,
{
    leaderboard: GlobalLeaderboardUseCase<U, K>,
    result_repo: Arc<S>,
}

impl<U, K, S> ExtendedLeaderboardUseCase<U, K, S>
where
    U: UserRepository,
    K: UserRankingRepository,
    S: LessonResultRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        ranking_repo: Arc<K>,
        result_repo: Arc<S>,
        config: Arc<RankingConfig>,
    ) -> Self {
        Self {
            leaderboard: GlobalLeaderboardUseCase::new(user_repo, ranking_repo, config),
            result_repo,
        }
    }

    pub async fn execute(&self, limit: Option<u32>) -> RankingResult<Vec<ExtendedLeaderboardEntry>> {
        let entries = self.leaderboard.execute(limit).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<_> = entries.iter().map(|entry| entry.user_id).collect();
        let activity: HashMap<_, UserActivity> = self
            .result_repo
            .activity_for_users(&user_ids)
            .await?
            .into_iter()
            .map(|activity| (activity.user_id, activity))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| {
                let activity = activity
                    .get(&entry.user_id)
                    .copied()
                    .unwrap_or_else(|| UserActivity::empty(entry.user_id));

                ExtendedLeaderboardEntry {
                    entry,
                    total_lessons: activity.total_lessons,
                    total_time_spent: activity.total_time_secs,
                    average_time_spent: CompletionTime::format_secs(activity.average_time_secs()),
                }
            })
            .collect())
    }
}
