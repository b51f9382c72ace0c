//! Lesson Catalog Use Cases

use std::sync::Arc;

use kernel::id::LessonId;

use crate::domain::entity::{Lesson, LessonLevel};
use crate::domain::repository::LessonRepository;
use crate::domain::services;
use crate::error::{RankingError, RankingResult};

pub struct GetLessonUseCase<L>
where
    L: LessonRepository,
{
    lesson_repo: Arc<L>,
}

impl<L> GetLessonUseCase<L>
where
    L: LessonRepository,
{
    pub fn new(lesson_repo: Arc<L>) -> Self {
        Self { lesson_repo }
    }

    pub async fn execute(&self, lesson_id: LessonId) -> RankingResult<Lesson> {
        self.lesson_repo
            .find_by_id(&lesson_id)
            .await?
            .ok_or(RankingError::LessonNotFound)
    }
}

/// Levels of one lesson type, each with its easy and hard variant
pub struct ListLessonLevelsUseCase<L>
where
    L: LessonRepository,
{
    lesson_repo: Arc<L>,
}

impl<L> ListLessonLevelsUseCase<L>
where
    L: LessonRepository,
{
    pub fn new(lesson_repo: Arc<L>) -> Self {
        Self { lesson_repo }
    }

    pub async fn execute(&self, lesson_type: &str) -> RankingResult<Vec<LessonLevel>> {
        let lesson_type = lesson_type.trim();
        if lesson_type.is_empty() {
            return Err(RankingError::invalid_argument("lesson type is required"));
        }

        let lessons = self.lesson_repo.find_by_type(lesson_type).await?;
        Ok(services::group_levels(&lessons))
    }
}

/// Every lesson type that has at least one lesson
pub struct ListLessonTypesUseCase<L>
where
    L: LessonRepository,
{
    lesson_repo: Arc<L>,
}

impl<L> ListLessonTypesUseCase<L>
where
    L: LessonRepository,
{
    pub fn new(lesson_repo: Arc<L>) -> Self {
        Self { lesson_repo }
    }

    pub async fn execute(&self) -> RankingResult<Vec<String>> {
        self.lesson_repo.find_types().await
    }
}
