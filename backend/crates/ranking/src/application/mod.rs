//! Application Layer - Use Cases
//!
//! Orchestrates the ranking rules in `domain::services` over the repository
//! traits.

pub mod complete_lesson;
pub mod config;
pub mod extended_leaderboard;
pub mod global_leaderboard;
pub mod lesson_leaderboard;
pub mod lessons;
pub mod ranking_history;
pub mod register_user;
pub mod update_rankings;
pub mod user_profile;
pub mod user_stats;

pub use complete_lesson::{CompleteLessonInput, CompleteLessonUseCase, CompletionResult};
pub use config::RankingConfig;
pub use extended_leaderboard::ExtendedLeaderboardUseCase;
pub use global_leaderboard::GlobalLeaderboardUseCase;
pub use lesson_leaderboard::LessonLeaderboardUseCase;
pub use lessons::{GetLessonUseCase, ListLessonLevelsUseCase, ListLessonTypesUseCase};
pub use ranking_history::RankingHistoryUseCase;
pub use register_user::{RegisterUserInput, RegisterUserUseCase};
pub use update_rankings::{RankingUpdate, UpdateRankingsUseCase};
pub use user_profile::{UpdateProfileUseCase, UserProfileUseCase};
pub use user_stats::UserStatsUseCase;
