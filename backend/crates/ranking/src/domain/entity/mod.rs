//! Domain Entities

pub mod leaderboard;
pub mod lesson;
pub mod lesson_result;
pub mod user;
pub mod user_ranking;

pub use leaderboard::{
    ExtendedLeaderboardEntry, LeaderboardEntry, LessonLeaderboard, LessonLeaderboardEntry,
    ResultSummary, UserActivity, UserStats,
};
pub use lesson::{Lesson, LessonLevel};
pub use lesson_result::{AppliedCompletion, LessonResult};
pub use user::{ProfileUpdate, User, UserProfile};
pub use user_ranking::UserRanking;
