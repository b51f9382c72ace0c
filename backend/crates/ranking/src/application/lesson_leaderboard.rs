//! Lesson Leaderboard Use Case
//!
//! Returns the window of a lesson's results around one user. The window holds
//! `2*limit+1` rows where the lesson has that many, is centered on the user
//! where possible and never runs past either end of the result set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kernel::id::{LessonId, UserId};

use crate::application::config::RankingConfig;
use crate::domain::entity::{LessonLeaderboard, LessonLeaderboardEntry, User};
use crate::domain::repository::{LessonResultRepository, UserRepository};
use crate::domain::services;
use crate::domain::value_object::Trend;
use crate::error::{RankingError, RankingResult};

pub struct LessonLeaderboardUseCase<U, S>
where
    U: UserRepository,
    S: LessonResultRepository,
{
    user_repo: Arc<U>,
    result_repo: Arc<S>,
    config: Arc<RankingConfig>,
}

impl<U, S> LessonLeaderboardUseCase<U, S>
where
    U: UserRepository,
    S: LessonResultRepository,
{
    pub fn new(user_repo: Arc<U>, result_repo: Arc<S>, config: Arc<RankingConfig>) -> Self {
        Self {
            user_repo,
            result_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        lesson_id: LessonId,
        user_id: UserId,
        limit: Option<u32>,
    ) -> RankingResult<LessonLeaderboard> {
        let limit = self.config.resolve_limit(limit)?;

        // "No completion" must stay distinguishable from "rank 1 of 1"
        let own = self
            .result_repo
            .find_by_user_and_lesson(&user_id, &lesson_id)
            .await?
            .ok_or(RankingError::ResultNotFound)?;

        let total_results = self.result_repo.count_by_lesson(&lesson_id).await?;
        let better = self
            .result_repo
            .count_better_than(&lesson_id, own.score)
            .await?;
        let user_rank = u32::try_from(better + 1).unwrap_or(u32::MAX);

        let ahead = self
            .result_repo
            .count_ahead_of(&lesson_id, own.score, &user_id)
            .await?;
        let window_start = services::window_start(ahead + 1, total_results, limit);
        let window_size = limit.saturating_mul(2).saturating_add(1);

        let rows = self
            .result_repo
            .range_by_lesson(&lesson_id, window_start - 1, window_size)
            .await?;

        let Some(first) = rows.first() else {
            return Ok(LessonLeaderboard {
                entries: Vec::new(),
                user_rank,
                total_results,
            });
        };

        let first_position = if first.score == own.score {
            user_rank
        } else {
            let ahead_of_first = self
                .result_repo
                .count_better_than(&lesson_id, first.score)
                .await?;
            u32::try_from(ahead_of_first + 1).unwrap_or(u32::MAX)
        };
        let scores: Vec<u64> = rows.iter().map(|row| row.score).collect();
        let positions = services::window_positions(first_position, window_start, &scores);

        let user_ids: Vec<UserId> = rows
            .iter()
            .map(|row| row.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let users: HashMap<UserId, User> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.user_id, user))
            .collect();

        let entries = rows
            .into_iter()
            .zip(positions)
            .map(|(row, position)| {
                let user = users.get(&row.user_id);
                if user.is_none() {
                    tracing::warn!(user_id = %row.user_id, "Result without a user");
                }

                LessonLeaderboardEntry {
                    user_id: row.user_id,
                    user_name: user.map(|u| u.user_name.to_string()).unwrap_or_default(),
                    first_name: user.and_then(|u| u.first_name.as_ref()).map(|n| n.to_string()),
                    last_name: user.and_then(|u| u.last_name.as_ref()).map(|n| n.to_string()),
                    position,
                    score: row.score,
                    completion_time: row.completion_time,
                    completion_time_display: row.completion_time.to_string(),
                    earned_experience: row.earned_experience,
                    trend: Trend::Stable,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            lesson_id = %lesson_id,
            user_id = %user_id,
            user_rank,
            window_start,
            rows = entries.len(),
            "Computed lesson leaderboard"
        );

        Ok(LessonLeaderboard {
            entries,
            user_rank,
            total_results,
        })
    }
}
