//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the pure ranking
//! rules.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{Lesson, LessonResult, User, UserRanking};
pub use repository::{
    CompletionUnitOfWork, LessonRepository, LessonResultRepository, RankingRepository,
    UserRankingRepository, UserRepository,
};
