//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{LessonId, LessonResultId, RankingBatchId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    AppliedCompletion, Lesson, LessonResult, ProfileUpdate, ResultSummary, User, UserActivity,
    UserRanking,
};
use crate::domain::repository::{
    CompletionUnitOfWork, LessonRepository, LessonResultRepository, UserRankingRepository,
    UserRepository,
};
use crate::domain::value_object::{CompletionTime, LessonMode, Period, PersonName, UserName};
use crate::error::{RankingError, RankingResult};

const UNIQUE_VIOLATION: &str = "23505";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// PostgreSQL-backed repository for every ranking store
#[derive(Clone)]
pub struct PgRankingRepository {
    pool: PgPool,
}

impl PgRankingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(code))
}

/// Unsigned domain values are stored in signed columns
fn to_db<T>(value: T, field: &'static str) -> RankingResult<i64>
where
    i64: TryFrom<T>,
{
    i64::try_from(value)
        .map_err(|_| RankingError::Internal(format!("{field} exceeds the storage range")))
}

/// Narrower columns reject what they cannot hold instead of clamping it
fn to_db_i32<T>(value: T, field: &'static str) -> RankingResult<i32>
where
    i32: TryFrom<T>,
{
    i32::try_from(value)
        .map_err(|_| RankingError::invalid_argument(format!("{field} exceeds the storage range")))
}

fn from_db<T>(value: i64, field: &'static str) -> RankingResult<T>
where
    T: TryFrom<i64>,
{
    T::try_from(value).map_err(|_| RankingError::Internal(format!("stored {field} is out of range")))
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    first_name: Option<String>,
    last_name: Option<String>,
    experience: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_entity(self) -> RankingResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(&self.user_name),
            first_name: self.first_name.map(PersonName::from_db),
            last_name: self.last_name.map(PersonName::from_db),
            experience: from_db(self.experience, "experience")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LessonRow {
    lesson_id: Uuid,
    lesson_type: String,
    level: i32,
    mode: String,
    xp: i32,
    content: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LessonRow {
    fn into_entity(self) -> RankingResult<Lesson> {
        let mode = LessonMode::from_code(&self.mode)
            .ok_or_else(|| RankingError::Internal(format!("unknown lesson mode '{}'", self.mode)))?;

        Ok(Lesson {
            lesson_id: LessonId::from_uuid(self.lesson_id),
            lesson_type: self.lesson_type,
            level: from_db(self.level.into(), "level")?,
            mode,
            xp: from_db(self.xp.into(), "xp")?,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ResultRow {
    result_id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    score: i64,
    completion_secs: i32,
    completed_at: DateTime<Utc>,
    earned_experience: i64,
}

impl ResultRow {
    fn into_entity(self) -> RankingResult<LessonResult> {
        Ok(LessonResult {
            result_id: LessonResultId::from_uuid(self.result_id),
            user_id: UserId::from_uuid(self.user_id),
            lesson_id: LessonId::from_uuid(self.lesson_id),
            score: from_db(self.score, "score")?,
            completion_time: CompletionTime::from_secs(from_db(
                self.completion_secs.into(),
                "completion time",
            )?),
            completed_at: self.completed_at,
            earned_experience: from_db(self.earned_experience, "earned experience")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RankingRow {
    batch_id: Uuid,
    user_id: Uuid,
    position: i32,
    experience: i64,
    period: String,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl RankingRow {
    fn into_entity(self) -> RankingResult<UserRanking> {
        let period = self
            .period
            .parse::<Period>()
            .map_err(|e| RankingError::Internal(e.to_string()))?;

        Ok(UserRanking {
            batch_id: RankingBatchId::from_uuid(self.batch_id),
            user_id: UserId::from_uuid(self.user_id),
            position: from_db(self.position.into(), "position")?,
            experience: from_db(self.experience, "experience")?,
            period,
            period_start: self.period_start,
            period_end: self.period_end,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    user_id: Uuid,
    total_lessons: i64,
    total_time: i64,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    total_lessons: i64,
    total_experience: i64,
    max_experience: i64,
    total_time: i64,
    fastest_secs: Option<i32>,
}

fn collect<R, T>(rows: Vec<R>, into_entity: fn(R) -> RankingResult<T>) -> RankingResult<Vec<T>> {
    rows.into_iter().map(into_entity).collect()
}

// ============================================================================
// User directory
// ============================================================================

const USER_COLUMNS: &str =
    "user_id, user_name, first_name, last_name, experience, created_at, updated_at";

impl UserRepository for PgRankingRepository {
    async fn create(&self, user: &User) -> RankingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                user_name_canonical,
                first_name,
                last_name,
                experience,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.user_id.into_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.first_name.as_ref().map(PersonName::as_str))
        .bind(user.last_name.as_ref().map(PersonName::as_str))
        .bind(to_db(user.experience, "experience")?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if has_code(&e, UNIQUE_VIOLATION) {
                RankingError::UserNameTaken
            } else {
                RankingError::store("users.create", user.user_id)(e)
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> RankingResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(RankingError::store("users.find_by_id", user_id))?
        .map(UserRow::into_entity)
        .transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> RankingResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name_canonical = $1"
        ))
        .bind(user_name.canonical())
        .fetch_optional(&self.pool)
        .await
        .map_err(RankingError::store("users.find_by_user_name", user_name))?
        .map(UserRow::into_entity)
        .transpose()
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> RankingResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name_canonical = $1)",
        )
        .bind(user_name.canonical())
        .fetch_one(&self.pool)
        .await
        .map_err(RankingError::store("users.exists_by_user_name", user_name))
    }

    async fn find_by_ids(&self, user_ids: &[UserId]) -> RankingResult<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = user_ids.iter().map(|id| id.into_uuid()).collect();

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store("users.find_by_ids", format!("{} ids", ids.len())))?;

        collect(rows, UserRow::into_entity)
    }

    async fn top_by_experience(&self, limit: u32) -> RankingResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            ORDER BY experience DESC, user_id ASC
            LIMIT $1
            "#
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store("users.top_by_experience", limit))?;

        collect(rows, UserRow::into_entity)
    }

    async fn update_experience(&self, user_id: &UserId, experience: u64) -> RankingResult<()> {
        let updated = sqlx::query(
            "UPDATE users SET experience = $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(user_id.into_uuid())
        .bind(to_db(experience, "experience")?)
        .execute(&self.pool)
        .await
        .map_err(RankingError::store("users.update_experience", user_id))?
        .rows_affected();

        if updated == 0 {
            return Err(RankingError::UserNotFound);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        profile: &ProfileUpdate,
    ) -> RankingResult<User> {
        sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                updated_at = now()
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id.into_uuid())
        .bind(profile.first_name.as_ref().map(PersonName::as_str))
        .bind(profile.last_name.as_ref().map(PersonName::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(RankingError::store("users.update_profile", user_id))?
        .ok_or(RankingError::UserNotFound)?
        .into_entity()
    }
}

// ============================================================================
// Lesson catalog
// ============================================================================

const LESSON_COLUMNS: &str =
    "lesson_id, lesson_type, level, mode, xp, content, created_at, updated_at";

impl LessonRepository for PgRankingRepository {
    async fn create(&self, lesson: &Lesson) -> RankingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO lessons (
                lesson_id,
                lesson_type,
                level,
                mode,
                xp,
                content,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(lesson.lesson_id.into_uuid())
        .bind(&lesson.lesson_type)
        .bind(to_db_i32(lesson.level, "level")?)
        .bind(lesson.mode.code())
        .bind(to_db_i32(lesson.xp, "xp")?)
        .bind(&lesson.content)
        .bind(lesson.created_at)
        .bind(lesson.updated_at)
        .execute(&self.pool)
        .await
        .map_err(RankingError::store("lessons.create", lesson.lesson_id))?;

        Ok(())
    }

    async fn find_by_id(&self, lesson_id: &LessonId) -> RankingResult<Option<Lesson>> {
        sqlx::query_as::<_, LessonRow>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE lesson_id = $1"
        ))
        .bind(lesson_id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(RankingError::store("lessons.find_by_id", lesson_id))?
        .map(LessonRow::into_entity)
        .transpose()
    }

    async fn find_by_type(&self, lesson_type: &str) -> RankingResult<Vec<Lesson>> {
        let rows = sqlx::query_as::<_, LessonRow>(&format!(
            r#"
            SELECT {LESSON_COLUMNS} FROM lessons
            WHERE lesson_type = $1
            ORDER BY level ASC, mode ASC
            "#
        ))
        .bind(lesson_type)
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store("lessons.find_by_type", lesson_type))?;

        collect(rows, LessonRow::into_entity)
    }

    async fn find_types(&self) -> RankingResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT lesson_type FROM lessons ORDER BY lesson_type ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store("lessons.find_types", "all"))
    }
}

// ============================================================================
// Score store
// ============================================================================

const RESULT_COLUMNS: &str = "result_id, user_id, lesson_id, score, completion_secs, completed_at, earned_experience";

impl LessonResultRepository for PgRankingRepository {
    async fn create(&self, result: &LessonResult) -> RankingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO lesson_results (
                result_id,
                user_id,
                lesson_id,
                score,
                completion_secs,
                completed_at,
                earned_experience
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(result.result_id.into_uuid())
        .bind(result.user_id.into_uuid())
        .bind(result.lesson_id.into_uuid())
        .bind(to_db(result.score, "score")?)
        .bind(to_db_i32(result.completion_time.as_secs(), "completion time")?)
        .bind(result.completed_at)
        .bind(to_db(result.earned_experience, "earned experience")?)
        .execute(&self.pool)
        .await
        .map_err(RankingError::store("lesson_results.create", result.result_id))?;

        Ok(())
    }

    async fn find_by_user_and_lesson(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> RankingResult<Option<LessonResult>> {
        sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {RESULT_COLUMNS} FROM lesson_results WHERE user_id = $1 AND lesson_id = $2"
        ))
        .bind(user_id.into_uuid())
        .bind(lesson_id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(RankingError::store(
            "lesson_results.find_by_user_and_lesson",
            format!("{user_id}/{lesson_id}"),
        ))?
        .map(ResultRow::into_entity)
        .transpose()
    }

    async fn update(&self, result: &LessonResult) -> RankingResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE lesson_results
            SET score = $2,
                completion_secs = $3,
                completed_at = $4,
                earned_experience = $5
            WHERE result_id = $1
            "#,
        )
        .bind(result.result_id.into_uuid())
        .bind(to_db(result.score, "score")?)
        .bind(to_db_i32(result.completion_time.as_secs(), "completion time")?)
        .bind(result.completed_at)
        .bind(to_db(result.earned_experience, "earned experience")?)
        .execute(&self.pool)
        .await
        .map_err(RankingError::store("lesson_results.update", result.result_id))?
        .rows_affected();

        if updated == 0 {
            return Err(RankingError::ResultNotFound);
        }
        Ok(())
    }

    async fn count_better_than(&self, lesson_id: &LessonId, score: u64) -> RankingResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lesson_results WHERE lesson_id = $1 AND score < $2",
        )
        .bind(lesson_id.into_uuid())
        .bind(to_db(score, "score")?)
        .fetch_one(&self.pool)
        .await
        .map_err(RankingError::store("lesson_results.count_better_than", lesson_id))?;

        from_db(count, "count")
    }

    async fn count_ahead_of(
        &self,
        lesson_id: &LessonId,
        score: u64,
        user_id: &UserId,
    ) -> RankingResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM lesson_results
            WHERE lesson_id = $1
              AND (score < $2 OR (score = $2 AND user_id < $3))
            "#,
        )
        .bind(lesson_id.into_uuid())
        .bind(to_db(score, "score")?)
        .bind(user_id.into_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(RankingError::store("lesson_results.count_ahead_of", lesson_id))?;

        from_db(count, "count")
    }

    async fn count_by_lesson(&self, lesson_id: &LessonId) -> RankingResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lesson_results WHERE lesson_id = $1",
        )
        .bind(lesson_id.into_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(RankingError::store("lesson_results.count_by_lesson", lesson_id))?;

        from_db(count, "count")
    }

    async fn range_by_lesson(
        &self,
        lesson_id: &LessonId,
        offset: u64,
        limit: u32,
    ) -> RankingResult<Vec<LessonResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!(
            r#"
            SELECT {RESULT_COLUMNS} FROM lesson_results
            WHERE lesson_id = $1
            ORDER BY score ASC, user_id ASC
            OFFSET $2
            LIMIT $3
            "#
        ))
        .bind(lesson_id.into_uuid())
        .bind(to_db(offset, "offset")?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store("lesson_results.range_by_lesson", lesson_id))?;

        collect(rows, ResultRow::into_entity)
    }

    async fn activity_for_users(&self, user_ids: &[UserId]) -> RankingResult<Vec<UserActivity>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = user_ids.iter().map(|id| id.into_uuid()).collect();

        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT
                user_id,
                COUNT(*)::BIGINT AS total_lessons,
                COALESCE(SUM(completion_secs), 0)::BIGINT AS total_time
            FROM lesson_results
            WHERE user_id = ANY($1)
            GROUP BY user_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store(
            "lesson_results.activity_for_users",
            format!("{} ids", ids.len()),
        ))?;

        rows.into_iter()
            .map(|row| {
                Ok(UserActivity {
                    user_id: UserId::from_uuid(row.user_id),
                    total_lessons: from_db(row.total_lessons, "total lessons")?,
                    total_time_secs: from_db(row.total_time, "total time")?,
                })
            })
            .collect()
    }

    async fn stats_for_user(&self, user_id: &UserId) -> RankingResult<ResultSummary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                COUNT(*)::BIGINT AS total_lessons,
                COALESCE(SUM(earned_experience), 0)::BIGINT AS total_experience,
                COALESCE(MAX(earned_experience), 0)::BIGINT AS max_experience,
                COALESCE(SUM(completion_secs), 0)::BIGINT AS total_time,
                MIN(completion_secs) AS fastest_secs
            FROM lesson_results
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.into_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(RankingError::store("lesson_results.stats_for_user", user_id))?;

        Ok(ResultSummary {
            total_lessons: from_db(row.total_lessons, "total lessons")?,
            total_experience: from_db(row.total_experience, "total experience")?,
            max_experience: from_db(row.max_experience, "max experience")?,
            total_time_secs: from_db(row.total_time, "total time")?,
            fastest_secs: row
                .fastest_secs
                .map(|secs| from_db(secs.into(), "fastest completion"))
                .transpose()?,
        })
    }
}

// ============================================================================
// Ranking snapshots
// ============================================================================

const RANKING_COLUMNS: &str =
    "batch_id, user_id, position, experience, period, period_start, period_end, created_at";

impl UserRankingRepository for PgRankingRepository {
    async fn save_batch(&self, rankings: &[UserRanking]) -> RankingResult<()> {
        let Some(head) = rankings.first() else {
            return Ok(());
        };
        if rankings.iter().any(|r| {
            r.batch_id != head.batch_id
                || r.period != head.period
                || r.period_start != head.period_start
                || r.period_end != head.period_end
        }) {
            return Err(RankingError::Internal(
                "snapshot rows must share one batch header".to_string(),
            ));
        }

        let user_ids: Vec<Uuid> = rankings.iter().map(|r| r.user_id.into_uuid()).collect();
        let positions = rankings
            .iter()
            .map(|r| to_db_i32(r.position, "position"))
            .collect::<RankingResult<Vec<i32>>>()?;
        let experiences = rankings
            .iter()
            .map(|r| to_db(r.experience, "experience"))
            .collect::<RankingResult<Vec<i64>>>()?;

        sqlx::query(
            r#"
            INSERT INTO user_rankings (
                batch_id,
                user_id,
                position,
                experience,
                period,
                period_start,
                period_end,
                created_at
            )
            SELECT $1, u.user_id, u.position, u.experience, $5, $6, $7, $8
            FROM UNNEST($2::UUID[], $3::INTEGER[], $4::BIGINT[])
                AS u(user_id, position, experience)
            "#,
        )
        .bind(head.batch_id.into_uuid())
        .bind(&user_ids)
        .bind(&positions)
        .bind(&experiences)
        .bind(head.period.code())
        .bind(head.period_start)
        .bind(head.period_end)
        .bind(head.created_at)
        .execute(&self.pool)
        .await
        .map_err(RankingError::store("user_rankings.save_batch", head.batch_id))?;

        tracing::debug!(
            batch_id = %head.batch_id,
            rows = rankings.len(),
            "Ranking batch inserted"
        );

        Ok(())
    }

    async fn latest_before(
        &self,
        period: Period,
        instant: DateTime<Utc>,
    ) -> RankingResult<Vec<UserRanking>> {
        let rows = sqlx::query_as::<_, RankingRow>(&format!(
            r#"
            SELECT {RANKING_COLUMNS} FROM user_rankings
            WHERE batch_id = (
                SELECT batch_id FROM user_rankings
                WHERE period = $1 AND period_end <= $2
                ORDER BY period_end DESC, created_at DESC, batch_id DESC
                LIMIT 1
            )
            ORDER BY position ASC
            "#
        ))
        .bind(period.code())
        .bind(instant)
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store("user_rankings.latest_before", period))?;

        collect(rows, RankingRow::into_entity)
    }

    async fn history_for_user(
        &self,
        user_id: &UserId,
        period: Period,
        limit: u32,
    ) -> RankingResult<Vec<UserRanking>> {
        let rows = sqlx::query_as::<_, RankingRow>(&format!(
            r#"
            SELECT {RANKING_COLUMNS} FROM user_rankings
            WHERE user_id = $1 AND period = $2
            ORDER BY period_end DESC, created_at DESC
            LIMIT $3
            "#
        ))
        .bind(user_id.into_uuid())
        .bind(period.code())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(RankingError::store("user_rankings.history_for_user", user_id))?;

        collect(rows, RankingRow::into_entity)
    }
}

// ============================================================================
// Completion unit of work
// ============================================================================

impl CompletionUnitOfWork for PgRankingRepository {
    async fn apply_completion(
        &self,
        earned: u64,
        result: &LessonResult,
    ) -> RankingResult<AppliedCompletion> {
        let user_id = result.user_id;
        let earned = i64::try_from(earned).map_err(|_| RankingError::ExperienceOverflow)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(RankingError::store("completion.begin", user_id))?;

        // Increment in place; no read-modify-write window
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET experience = experience + $2, updated_at = now()
            WHERE user_id = $1
            RETURNING experience
            "#,
        )
        .bind(user_id.into_uuid())
        .bind(earned)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if has_code(&e, NUMERIC_VALUE_OUT_OF_RANGE) {
                RankingError::ExperienceOverflow
            } else {
                RankingError::store("completion.add_experience", user_id)(e)
            }
        })?
        .ok_or(RankingError::UserNotFound)?;

        // xmax is 0 only for a freshly inserted tuple
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO lesson_results (
                result_id,
                user_id,
                lesson_id,
                score,
                completion_secs,
                completed_at,
                earned_experience
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, lesson_id) DO UPDATE
            SET score = EXCLUDED.score,
                completion_secs = EXCLUDED.completion_secs,
                completed_at = EXCLUDED.completed_at,
                earned_experience = EXCLUDED.earned_experience
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(result.result_id.into_uuid())
        .bind(user_id.into_uuid())
        .bind(result.lesson_id.into_uuid())
        .bind(to_db(result.score, "score")?)
        .bind(to_db_i32(result.completion_time.as_secs(), "completion time")?)
        .bind(result.completed_at)
        .bind(earned)
        .fetch_one(&mut *tx)
        .await
        .map_err(RankingError::store(
            "completion.upsert_result",
            format!("{user_id}/{}", result.lesson_id),
        ))?;

        tx.commit()
            .await
            .map_err(RankingError::store("completion.commit", user_id))?;

        Ok(AppliedCompletion {
            total_experience: from_db(total, "experience")?,
            first_completion: inserted,
        })
    }
}
