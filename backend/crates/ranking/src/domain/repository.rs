//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.

use chrono::{DateTime, Utc};
use kernel::id::{LessonId, UserId};

use crate::domain::entity::{
    AppliedCompletion, Lesson, LessonResult, ProfileUpdate, ResultSummary, User, UserActivity,
    UserRanking,
};
use crate::domain::value_object::{Period, UserName};
use crate::error::RankingResult;

/// User directory
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create(&self, user: &User) -> RankingResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> RankingResult<Option<User>>;

    async fn find_by_user_name(&self, user_name: &UserName) -> RankingResult<Option<User>>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> RankingResult<bool>;

    /// Batch lookup; unknown ids are skipped, order is unspecified
    async fn find_by_ids(&self, user_ids: &[UserId]) -> RankingResult<Vec<User>>;

    /// Users by experience descending, ties by id ascending
    async fn top_by_experience(&self, limit: u32) -> RankingResult<Vec<User>>;

    async fn update_experience(&self, user_id: &UserId, experience: u64) -> RankingResult<()>;

    /// Set the given name parts and return the stored user
    async fn update_profile(
        &self,
        user_id: &UserId,
        profile: &ProfileUpdate,
    ) -> RankingResult<User>;
}

/// Lesson catalog
#[trait_variant::make(LessonRepository: Send)]
pub trait LocalLessonRepository {
    async fn create(&self, lesson: &Lesson) -> RankingResult<()>;

    async fn find_by_id(&self, lesson_id: &LessonId) -> RankingResult<Option<Lesson>>;

    /// All lessons of a type, ordered by level
    async fn find_by_type(&self, lesson_type: &str) -> RankingResult<Vec<Lesson>>;

    /// Distinct lesson types, sorted
    async fn find_types(&self) -> RankingResult<Vec<String>>;
}

/// Score store. Every ordering is score ascending, then user id ascending.
#[trait_variant::make(LessonResultRepository: Send)]
pub trait LocalLessonResultRepository {
    async fn create(&self, result: &LessonResult) -> RankingResult<()>;

    async fn find_by_user_and_lesson(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> RankingResult<Option<LessonResult>>;

    async fn update(&self, result: &LessonResult) -> RankingResult<()>;

    /// Results of the lesson with a strictly lower score
    async fn count_better_than(&self, lesson_id: &LessonId, score: u64) -> RankingResult<u64>;

    /// Results ordered strictly before `(score, user_id)`
    async fn count_ahead_of(
        &self,
        lesson_id: &LessonId,
        score: u64,
        user_id: &UserId,
    ) -> RankingResult<u64>;

    async fn count_by_lesson(&self, lesson_id: &LessonId) -> RankingResult<u64>;

    async fn range_by_lesson(
        &self,
        lesson_id: &LessonId,
        offset: u64,
        limit: u32,
    ) -> RankingResult<Vec<LessonResult>>;

    /// One aggregate per user that has at least one result
    async fn activity_for_users(&self, user_ids: &[UserId]) -> RankingResult<Vec<UserActivity>>;

    async fn stats_for_user(&self, user_id: &UserId) -> RankingResult<ResultSummary>;
}

/// Ranking snapshot store (append only)
#[trait_variant::make(UserRankingRepository: Send)]
pub trait LocalUserRankingRepository {
    async fn save_batch(&self, rankings: &[UserRanking]) -> RankingResult<()>;

    /// Rows of the most recent batch of `period` whose period ended at or
    /// before `instant`. Empty if there is none.
    async fn latest_before(
        &self,
        period: Period,
        instant: DateTime<Utc>,
    ) -> RankingResult<Vec<UserRanking>>;

    /// A user's snapshots for `period`, newest period first
    async fn history_for_user(
        &self,
        user_id: &UserId,
        period: Period,
        limit: u32,
    ) -> RankingResult<Vec<UserRanking>>;
}

/// Completion writes that must land together
#[trait_variant::make(CompletionUnitOfWork: Send)]
pub trait LocalCompletionUnitOfWork {
    /// Atomically add `earned` to the user's experience and upsert `result`
    /// on (user, lesson).
    async fn apply_completion(
        &self,
        earned: u64,
        result: &LessonResult,
    ) -> RankingResult<AppliedCompletion>;
}

/// Everything the ranking use cases need from one backing store
pub trait RankingRepository:
    UserRepository
    + LessonRepository
    + LessonResultRepository
    + UserRankingRepository
    + CompletionUnitOfWork
    + Sync
{
}

impl<T> RankingRepository for T where
    T: UserRepository
        + LessonRepository
        + LessonResultRepository
        + UserRankingRepository
        + CompletionUnitOfWork
        + Sync
{
}
