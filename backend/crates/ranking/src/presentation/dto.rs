//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{LessonId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::CompletionResult;
use crate::domain::entity::{LessonLeaderboard, Lesson, User, UserProfile, UserStats};
use crate::domain::value_object::LessonMode;

/// Query for GET /api/leaderboard and /api/leaderboard/extended
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query for GET /api/leaderboard/lessons/{lesson_id}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonLeaderboardQuery {
    pub user_id: UserId,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query for GET /api/users/{user_id}/rankings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingHistoryQuery {
    /// `daily`, `weekly` or `monthly`; the trend period when absent
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query for GET /api/lessons
#[derive(Debug, Clone, Deserialize)]
pub struct LessonsQuery {
    #[serde(rename = "type")]
    pub lesson_type: String,
}

/// Request for POST /api/users
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub user_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Request for PATCH /api/users/{user_id}
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Response for POST /api/users and PATCH /api/users/{user_id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub experience: u64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name.to_string(),
            first_name: user.first_name.map(|n| n.to_string()),
            last_name: user.last_name.map(|n| n.to_string()),
            experience: user.experience,
            created_at: user.created_at,
        }
    }
}

/// Response for GET /api/users/by-name/{user_name}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub user: UserResponse,
    pub stats: UserStats,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user: UserResponse::from(profile.user),
            stats: profile.stats,
        }
    }
}

/// Response for GET /api/lessons/{lesson_id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub lesson_id: LessonId,
    pub lesson_type: String,
    pub level: u32,
    pub mode: LessonMode,
    pub xp: u32,
    pub content: serde_json::Value,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            lesson_id: lesson.lesson_id,
            lesson_type: lesson.lesson_type,
            level: lesson.level,
            mode: lesson.mode,
            xp: lesson.xp,
            content: lesson.content,
        }
    }
}

/// Request for POST /api/lessons/{lesson_id}/complete
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonRequest {
    pub user_id: UserId,
    /// Seconds
    pub completion_time: u32,
    /// The lesson's xp when absent
    #[serde(default)]
    pub earned_experience: Option<u64>,
}

/// Response for POST /api/lessons/{lesson_id}/complete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonResponse {
    pub result: CompletionResult,
    pub leaderboard: LessonLeaderboard,
}
