//! Complete Lesson Use Case
//!
//! Applies one completion event: experience accrues on the user and the
//! (user, lesson) result is upserted, both in one unit of work.

use std::sync::Arc;

use kernel::id::{LessonId, UserId};
use serde::Serialize;

use crate::domain::entity::LessonResult;
use crate::domain::repository::{CompletionUnitOfWork, LessonRepository, UserRepository};
use crate::domain::value_object::CompletionTime;
use crate::error::{RankingError, RankingResult};

#[derive(Debug, Clone)]
pub struct CompleteLessonInput {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completion_time: CompletionTime,
    /// Falls back to the lesson's own xp
    pub earned_experience: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub total_experience: u64,
    pub earned_experience: u64,
    pub completion_time: CompletionTime,
    pub first_completion: bool,
}

pub struct CompleteLessonUseCase<U, L, W>
where
    U: UserRepository,
    L: LessonRepository,
    W: CompletionUnitOfWork,
{
    user_repo: Arc<U>,
    lesson_repo: Arc<L>,
    unit_of_work: Arc<W>,
}

impl<U, L, W> CompleteLessonUseCase<U, L, W>
where
    U: UserRepository,
    L: LessonRepository,
    W: CompletionUnitOfWork,
{
    pub fn new(user_repo: Arc<U>, lesson_repo: Arc<L>, unit_of_work: Arc<W>) -> Self {
        Self {
            user_repo,
            lesson_repo,
            unit_of_work,
        }
    }

    pub async fn execute(&self, input: CompleteLessonInput) -> RankingResult<CompletionResult> {
        if !input.completion_time.is_recordable() {
            return Err(RankingError::invalid_argument(format!(
                "completion time must be at most {} seconds",
                CompletionTime::MAX_SECS
            )));
        }

        let user = self
            .user_repo
            .find_by_id(&input.user_id)
            .await?
            .ok_or(RankingError::UserNotFound)?;

        let lesson = self
            .lesson_repo
            .find_by_id(&input.lesson_id)
            .await?
            .ok_or(RankingError::LessonNotFound)?;

        let earned = input
            .earned_experience
            .unwrap_or_else(|| u64::from(lesson.xp));

        // The store re-checks under its own lock; this catches the common case early
        if user.experience_after(earned).is_none() {
            return Err(RankingError::ExperienceOverflow);
        }

        let result = LessonResult::from_completion(
            user.user_id,
            lesson.lesson_id,
            input.completion_time,
            earned,
        );
        let applied = self.unit_of_work.apply_completion(earned, &result).await?;

        tracing::info!(
            user_id = %user.user_id,
            lesson_id = %lesson.lesson_id,
            earned,
            total = applied.total_experience,
            completion_time = %input.completion_time,
            first = applied.first_completion,
            "Lesson completed"
        );

        Ok(CompletionResult {
            user_id: user.user_id,
            lesson_id: lesson.lesson_id,
            total_experience: applied.total_experience,
            earned_experience: earned,
            completion_time: input.completion_time,
            first_completion: applied.first_completion,
        })
    }
}
