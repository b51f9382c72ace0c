//! Derived leaderboard views
//!
//! Nothing here is persisted; every value is computed on demand from users,
//! lesson results and ranking snapshots.

use kernel::id::UserId;
use serde::Serialize;

use crate::domain::value_object::{CompletionTime, Trend};

/// Row of the global (experience) leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub position: u32,
    pub experience: u64,
    pub trend: Trend,
}

/// Global leaderboard row with lesson activity attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedLeaderboardEntry {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub total_lessons: u64,
    /// Seconds
    pub total_time_spent: u64,
    /// `MM:SS`
    pub average_time_spent: String,
}

/// Row of a lesson leaderboard window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonLeaderboardEntry {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub position: u32,
    pub score: u64,
    pub completion_time: CompletionTime,
    pub completion_time_display: String,
    pub earned_experience: u64,
    pub trend: Trend,
}

/// Window of a lesson's results around one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonLeaderboard {
    pub entries: Vec<LessonLeaderboardEntry>,
    /// Competition rank of the requesting user
    pub user_rank: u32,
    pub total_results: u64,
}

/// Aggregated lesson activity of one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserActivity {
    pub user_id: UserId,
    pub total_lessons: u64,
    pub total_time_secs: u64,
}

impl UserActivity {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            total_lessons: 0,
            total_time_secs: 0,
        }
    }

    pub fn average_time_secs(&self) -> f64 {
        if self.total_lessons == 0 {
            0.0
        } else {
            self.total_time_secs as f64 / self.total_lessons as f64
        }
    }
}

/// Per-user statistics over all of their lesson results
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_lessons: u64,
    pub total_experience: u64,
    pub average_experience: f64,
    pub max_experience: u64,
    /// `MM:SS`, `None` without results
    pub fastest_completion: Option<String>,
    /// Seconds
    pub average_completion: f64,
}

/// Raw aggregate of one user's results as the store computes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultSummary {
    pub total_lessons: u64,
    pub total_experience: u64,
    pub max_experience: u64,
    pub total_time_secs: u64,
    pub fastest_secs: Option<u32>,
}

impl From<ResultSummary> for UserStats {
    fn from(summary: ResultSummary) -> Self {
        if summary.total_lessons == 0 {
            return UserStats::default();
        }
        let lessons = summary.total_lessons as f64;

        UserStats {
            total_lessons: summary.total_lessons,
            total_experience: summary.total_experience,
            average_experience: summary.total_experience as f64 / lessons,
            max_experience: summary.max_experience,
            fastest_completion: summary
                .fastest_secs
                .map(|secs| CompletionTime::from_secs(secs).to_string()),
            average_completion: summary.total_time_secs as f64 / lessons,
        }
    }
}
