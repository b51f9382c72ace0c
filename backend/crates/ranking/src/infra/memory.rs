//! In-Memory Repository
//!
//! Same contracts as the PostgreSQL repository, held behind one async lock.
//! Used by the test suite and for running the service without a database.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{LessonId, UserId};
use tokio::sync::RwLock;

use crate::domain::entity::{
    AppliedCompletion, Lesson, LessonResult, ProfileUpdate, ResultSummary, User, UserActivity,
    UserRanking,
};
use crate::domain::repository::{
    CompletionUnitOfWork, LessonRepository, LessonResultRepository, UserRankingRepository,
    UserRepository,
};
use crate::domain::value_object::{Period, UserName};
use crate::error::{RankingError, RankingResult};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    lessons: HashMap<LessonId, Lesson>,
    results: HashMap<(UserId, LessonId), LessonResult>,
    rankings: Vec<UserRanking>,
}

impl State {
    /// Results of one lesson, score ascending then user id ascending
    fn lesson_results(&self, lesson_id: &LessonId) -> Vec<&LessonResult> {
        let mut rows: Vec<_> = self
            .results
            .values()
            .filter(|r| r.lesson_id == *lesson_id)
            .collect();
        rows.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.user_id.cmp(&b.user_id)));
        rows
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRankingRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryRankingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user as-is
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.user_id, user);
    }

    pub async fn insert_lesson(&self, lesson: Lesson) {
        self.state
            .write()
            .await
            .lessons
            .insert(lesson.lesson_id, lesson);
    }

    /// Insert or replace the result of its (user, lesson) pair
    pub async fn insert_result(&self, result: LessonResult) {
        self.state
            .write()
            .await
            .results
            .insert((result.user_id, result.lesson_id), result);
    }

    pub async fn result_count(&self) -> usize {
        self.state.read().await.results.len()
    }

    pub async fn ranking_count(&self) -> usize {
        self.state.read().await.rankings.len()
    }
}

fn experience_order(a: &User, b: &User) -> Ordering {
    b.experience
        .cmp(&a.experience)
        .then_with(|| a.user_id.cmp(&b.user_id))
}

impl UserRepository for InMemoryRankingRepository {
    async fn create(&self, user: &User) -> RankingResult<()> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.user_name.canonical() == user.user_name.canonical())
        {
            return Err(RankingError::UserNameTaken);
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> RankingResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> RankingResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.user_name.canonical() == user_name.canonical())
            .cloned())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> RankingResult<bool> {
        Ok(self.find_by_user_name(user_name).await?.is_some())
    }

    async fn find_by_ids(&self, user_ids: &[UserId]) -> RankingResult<Vec<User>> {
        let state = self.state.read().await;
        let wanted: HashSet<&UserId> = user_ids.iter().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn top_by_experience(&self, limit: u32) -> RankingResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(experience_order);
        users.truncate(limit as usize);
        Ok(users)
    }

    async fn update_experience(&self, user_id: &UserId, experience: u64) -> RankingResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or(RankingError::UserNotFound)?;
        user.experience = experience;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        profile: &ProfileUpdate,
    ) -> RankingResult<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or(RankingError::UserNotFound)?;
        user.apply_profile(profile);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

impl LessonRepository for InMemoryRankingRepository {
    async fn create(&self, lesson: &Lesson) -> RankingResult<()> {
        self.insert_lesson(lesson.clone()).await;
        Ok(())
    }

    async fn find_by_id(&self, lesson_id: &LessonId) -> RankingResult<Option<Lesson>> {
        Ok(self.state.read().await.lessons.get(lesson_id).cloned())
    }

    async fn find_by_type(&self, lesson_type: &str) -> RankingResult<Vec<Lesson>> {
        let state = self.state.read().await;
        let mut lessons: Vec<Lesson> = state
            .lessons
            .values()
            .filter(|l| l.lesson_type == lesson_type)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| (l.level, l.mode.code()));
        Ok(lessons)
    }

    async fn find_types(&self) -> RankingResult<Vec<String>> {
        let state = self.state.read().await;
        let types: BTreeSet<&str> = state
            .lessons
            .values()
            .map(|l| l.lesson_type.as_str())
            .collect();
        Ok(types.into_iter().map(str::to_string).collect())
    }
}

impl LessonResultRepository for InMemoryRankingRepository {
    async fn create(&self, result: &LessonResult) -> RankingResult<()> {
        let mut state = self.state.write().await;
        let key = (result.user_id, result.lesson_id);
        if state.results.contains_key(&key) {
            return Err(RankingError::Internal(format!(
                "duplicate result for {}/{}",
                result.user_id, result.lesson_id
            )));
        }
        state.results.insert(key, result.clone());
        Ok(())
    }

    async fn find_by_user_and_lesson(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> RankingResult<Option<LessonResult>> {
        Ok(self
            .state
            .read()
            .await
            .results
            .get(&(*user_id, *lesson_id))
            .cloned())
    }

    async fn update(&self, result: &LessonResult) -> RankingResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .results
            .values_mut()
            .find(|r| r.result_id == result.result_id)
            .ok_or(RankingError::ResultNotFound)?;
        stored.overwrite_with(result);
        Ok(())
    }

    async fn count_better_than(&self, lesson_id: &LessonId, score: u64) -> RankingResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .results
            .values()
            .filter(|r| r.lesson_id == *lesson_id && r.score < score)
            .count() as u64)
    }

    async fn count_ahead_of(
        &self,
        lesson_id: &LessonId,
        score: u64,
        user_id: &UserId,
    ) -> RankingResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .results
            .values()
            .filter(|r| {
                r.lesson_id == *lesson_id
                    && (r.score < score || (r.score == score && r.user_id < *user_id))
            })
            .count() as u64)
    }

    async fn count_by_lesson(&self, lesson_id: &LessonId) -> RankingResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .results
            .values()
            .filter(|r| r.lesson_id == *lesson_id)
            .count() as u64)
    }

    async fn range_by_lesson(
        &self,
        lesson_id: &LessonId,
        offset: u64,
        limit: u32,
    ) -> RankingResult<Vec<LessonResult>> {
        let state = self.state.read().await;
        Ok(state
            .lesson_results(lesson_id)
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn activity_for_users(&self, user_ids: &[UserId]) -> RankingResult<Vec<UserActivity>> {
        let state = self.state.read().await;
        let wanted: HashSet<&UserId> = user_ids.iter().collect();
        let mut activity: HashMap<UserId, UserActivity> = HashMap::new();

        for result in state.results.values().filter(|r| wanted.contains(&r.user_id)) {
            let entry = activity
                .entry(result.user_id)
                .or_insert_with(|| UserActivity::empty(result.user_id));
            entry.total_lessons += 1;
            entry.total_time_secs += u64::from(result.completion_time.as_secs());
        }

        Ok(activity.into_values().collect())
    }

    async fn stats_for_user(&self, user_id: &UserId) -> RankingResult<ResultSummary> {
        let state = self.state.read().await;
        let mut summary = ResultSummary::default();

        for result in state.results.values().filter(|r| r.user_id == *user_id) {
            let secs = result.completion_time.as_secs();
            summary.total_lessons += 1;
            summary.total_experience = summary
                .total_experience
                .saturating_add(result.earned_experience);
            summary.max_experience = summary.max_experience.max(result.earned_experience);
            summary.total_time_secs += u64::from(secs);
            summary.fastest_secs = Some(summary.fastest_secs.map_or(secs, |f| f.min(secs)));
        }

        Ok(summary)
    }
}

impl UserRankingRepository for InMemoryRankingRepository {
    async fn save_batch(&self, rankings: &[UserRanking]) -> RankingResult<()> {
        self.state
            .write()
            .await
            .rankings
            .extend_from_slice(rankings);
        Ok(())
    }

    async fn latest_before(
        &self,
        period: Period,
        instant: DateTime<Utc>,
    ) -> RankingResult<Vec<UserRanking>> {
        let state = self.state.read().await;

        let latest = state
            .rankings
            .iter()
            .filter(|r| r.period == period && r.period_end <= instant)
            .max_by(|a, b| {
                a.period_end
                    .cmp(&b.period_end)
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.batch_id.cmp(&b.batch_id))
            })
            .map(|r| r.batch_id);

        let Some(batch_id) = latest else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<UserRanking> = state
            .rankings
            .iter()
            .filter(|r| r.batch_id == batch_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.position);
        Ok(rows)
    }

    async fn history_for_user(
        &self,
        user_id: &UserId,
        period: Period,
        limit: u32,
    ) -> RankingResult<Vec<UserRanking>> {
        let state = self.state.read().await;
        let mut rows: Vec<UserRanking> = state
            .rankings
            .iter()
            .filter(|r| r.user_id == *user_id && r.period == period)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.period_end
                .cmp(&a.period_end)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

impl CompletionUnitOfWork for InMemoryRankingRepository {
    async fn apply_completion(
        &self,
        earned: u64,
        result: &LessonResult,
    ) -> RankingResult<AppliedCompletion> {
        // One write guard covers both mutations
        let mut state = self.state.write().await;

        let user = state
            .users
            .get_mut(&result.user_id)
            .ok_or(RankingError::UserNotFound)?;
        let total = user
            .experience
            .checked_add(earned)
            .ok_or(RankingError::ExperienceOverflow)?;
        user.experience = total;
        user.updated_at = Utc::now();

        let first_completion = match state.results.get_mut(&(result.user_id, result.lesson_id)) {
            Some(existing) => {
                existing.overwrite_with(result);
                false
            }
            None => {
                state
                    .results
                    .insert((result.user_id, result.lesson_id), result.clone());
                true
            }
        };

        Ok(AppliedCompletion {
            total_experience: total,
            first_completion,
        })
    }
}
