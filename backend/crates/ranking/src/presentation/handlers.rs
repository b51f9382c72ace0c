//! HTTP Handlers
//!
//! The acting user's id arrives explicitly in the path, query or body;
//! authenticating it is left to whatever sits in front of this router.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::id::{LessonId, UserId};

use crate::application::config::RankingConfig;
use crate::application::{
    CompleteLessonInput, CompleteLessonUseCase, ExtendedLeaderboardUseCase, GetLessonUseCase,
    GlobalLeaderboardUseCase, LessonLeaderboardUseCase, ListLessonLevelsUseCase,
    ListLessonTypesUseCase, RankingHistoryUseCase, RankingUpdate, RegisterUserInput,
    RegisterUserUseCase, UpdateProfileUseCase, UpdateRankingsUseCase, UserProfileUseCase,
    UserStatsUseCase,
};
use crate::domain::entity::{
    ExtendedLeaderboardEntry, LeaderboardEntry, LessonLeaderboard, LessonLevel, UserRanking,
    UserStats,
};
use crate::domain::repository::RankingRepository;
use crate::domain::value_object::{CompletionTime, Period};
use crate::error::RankingResult;
use crate::presentation::dto::{
    CompleteLessonRequest, CompleteLessonResponse, LessonLeaderboardQuery, LessonResponse,
    LessonsQuery, LimitQuery, RankingHistoryQuery, RegisterUserRequest, UpdateProfileRequest,
    UserProfileResponse, UserResponse,
};

/// Shared state for ranking handlers
#[derive(Clone)]
pub struct RankingAppState<R>
where
    R: RankingRepository + Clone + Send + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<RankingConfig>,
}

/// GET /api/leaderboard
pub async fn global_leaderboard<R>(
    State(state): State<RankingAppState<R>>,
    Query(query): Query<LimitQuery>,
) -> RankingResult<Json<Vec<LeaderboardEntry>>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = GlobalLeaderboardUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    Ok(Json(use_case.execute(query.limit).await?))
}

/// GET /api/leaderboard/extended
pub async fn extended_leaderboard<R>(
    State(state): State<RankingAppState<R>>,
    Query(query): Query<LimitQuery>,
) -> RankingResult<Json<Vec<ExtendedLeaderboardEntry>>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = ExtendedLeaderboardUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    Ok(Json(use_case.execute(query.limit).await?))
}

/// GET /api/leaderboard/lessons/{lesson_id}
pub async fn lesson_leaderboard<R>(
    State(state): State<RankingAppState<R>>,
    Path(lesson_id): Path<LessonId>,
    Query(query): Query<LessonLeaderboardQuery>,
) -> RankingResult<Json<LessonLeaderboard>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case =
        LessonLeaderboardUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    Ok(Json(
        use_case
            .execute(lesson_id, query.user_id, query.limit)
            .await?,
    ))
}

/// POST /api/leaderboard/rankings/{period}
pub async fn update_rankings<R>(
    State(state): State<RankingAppState<R>>,
    Path(period): Path<String>,
) -> RankingResult<(StatusCode, Json<RankingUpdate>)>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let period = period.parse::<Period>()?;

    let use_case =
        UpdateRankingsUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    Ok((StatusCode::CREATED, Json(use_case.execute(period).await?)))
}

/// POST /api/users
pub async fn register_user<R>(
    State(state): State<RankingAppState<R>>,
    Json(req): Json<RegisterUserRequest>,
) -> RankingResult<(StatusCode, Json<UserResponse>)>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = RegisterUserUseCase::new(state.repo.clone());
    let user = use_case
        .execute(RegisterUserInput {
            user_name: req.user_name,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// PATCH /api/users/{user_id}
pub async fn update_profile<R>(
    State(state): State<RankingAppState<R>>,
    Path(user_id): Path<UserId>,
    Json(req): Json<UpdateProfileRequest>,
) -> RankingResult<Json<UserResponse>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = UpdateProfileUseCase::new(state.repo.clone());
    let user = use_case
        .execute(user_id, req.first_name.as_deref(), req.last_name.as_deref())
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// GET /api/users/by-name/{user_name}
pub async fn user_profile<R>(
    State(state): State<RankingAppState<R>>,
    Path(user_name): Path<String>,
) -> RankingResult<Json<UserProfileResponse>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = UserProfileUseCase::new(state.repo.clone(), state.repo.clone());

    Ok(Json(UserProfileResponse::from(
        use_case.execute(&user_name).await?,
    )))
}

/// GET /api/users/{user_id}/stats
pub async fn user_stats<R>(
    State(state): State<RankingAppState<R>>,
    Path(user_id): Path<UserId>,
) -> RankingResult<Json<UserStats>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = UserStatsUseCase::new(state.repo.clone(), state.repo.clone());

    Ok(Json(use_case.execute(user_id).await?))
}

/// GET /api/users/{user_id}/rankings
pub async fn ranking_history<R>(
    State(state): State<RankingAppState<R>>,
    Path(user_id): Path<UserId>,
    Query(query): Query<RankingHistoryQuery>,
) -> RankingResult<Json<Vec<UserRanking>>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let period = match query.period.as_deref() {
        Some(tag) => tag.parse::<Period>()?,
        None => state.config.trend_period,
    };

    let use_case =
        RankingHistoryUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    Ok(Json(use_case.execute(user_id, period, query.limit).await?))
}

/// GET /api/lessons?type=
pub async fn list_lesson_levels<R>(
    State(state): State<RankingAppState<R>>,
    Query(query): Query<LessonsQuery>,
) -> RankingResult<Json<Vec<LessonLevel>>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = ListLessonLevelsUseCase::new(state.repo.clone());

    Ok(Json(use_case.execute(&query.lesson_type).await?))
}

/// GET /api/lessons/types
pub async fn list_lesson_types<R>(
    State(state): State<RankingAppState<R>>,
) -> RankingResult<Json<Vec<String>>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = ListLessonTypesUseCase::new(state.repo.clone());

    Ok(Json(use_case.execute().await?))
}

/// GET /api/lessons/{lesson_id}
pub async fn get_lesson<R>(
    State(state): State<RankingAppState<R>>,
    Path(lesson_id): Path<LessonId>,
) -> RankingResult<Json<LessonResponse>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let use_case = GetLessonUseCase::new(state.repo.clone());
    let lesson = use_case.execute(lesson_id).await?;

    Ok(Json(LessonResponse::from(lesson)))
}

/// POST /api/lessons/{lesson_id}/complete
///
/// Applies the completion, then reads the lesson leaderboard around the user.
pub async fn complete_lesson<R>(
    State(state): State<RankingAppState<R>>,
    Path(lesson_id): Path<LessonId>,
    Json(req): Json<CompleteLessonRequest>,
) -> RankingResult<Json<CompleteLessonResponse>>
where
    R: RankingRepository + Clone + Send + 'static,
{
    let completion =
        CompleteLessonUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    let result = completion
        .execute(CompleteLessonInput {
            user_id: req.user_id,
            lesson_id,
            completion_time: CompletionTime::from_secs(req.completion_time),
            earned_experience: req.earned_experience,
        })
        .await?;

    let leaderboard =
        LessonLeaderboardUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone())
            .execute(
                lesson_id,
                result.user_id,
                Some(state.config.completion_leaderboard_limit),
            )
            .await?;

    Ok(Json(CompleteLessonResponse {
        result,
        leaderboard,
    }))
}
