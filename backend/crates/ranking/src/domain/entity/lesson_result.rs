//! Lesson Result Entity
//!
//! At most one result exists per (user, lesson); repeat completions overwrite
//! it in place.

use chrono::{DateTime, Utc};
use kernel::id::{LessonId, LessonResultId, UserId};

use crate::domain::value_object::CompletionTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonResult {
    pub result_id: LessonResultId,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    /// Lower is better
    pub score: u64,
    pub completion_time: CompletionTime,
    pub completed_at: DateTime<Utc>,
    pub earned_experience: u64,
}

impl LessonResult {
    /// Result of a completion, scored by elapsed time
    pub fn from_completion(
        user_id: UserId,
        lesson_id: LessonId,
        completion_time: CompletionTime,
        earned_experience: u64,
    ) -> Self {
        Self {
            result_id: LessonResultId::new(),
            user_id,
            lesson_id,
            score: u64::from(completion_time.as_secs()),
            completion_time,
            completed_at: Utc::now(),
            earned_experience,
        }
    }

    /// Overwrite the attempt fields with those of a later completion.
    /// Identity (`result_id`, user, lesson) is kept.
    pub fn overwrite_with(&mut self, later: &LessonResult) {
        self.score = later.score;
        self.completion_time = later.completion_time;
        self.completed_at = later.completed_at;
        self.earned_experience = later.earned_experience;
    }
}

/// What the store reports back after applying a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedCompletion {
    /// Authoritative total after the increment
    pub total_experience: u64,
    /// No earlier result existed for the pair
    pub first_completion: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_elapsed_seconds() {
        let result = LessonResult::from_completion(
            UserId::new(),
            LessonId::new(),
            CompletionTime::from_secs(90),
            40,
        );
        assert_eq!(result.score, 90);
        assert_eq!(result.earned_experience, 40);
    }

    #[test]
    fn test_overwrite_keeps_identity() {
        let user_id = UserId::new();
        let lesson_id = LessonId::new();
        let mut first =
            LessonResult::from_completion(user_id, lesson_id, CompletionTime::from_secs(120), 10);
        let second =
            LessonResult::from_completion(user_id, lesson_id, CompletionTime::from_secs(75), 30);

        let original_id = first.result_id;
        first.overwrite_with(&second);

        assert_eq!(first.result_id, original_id);
        assert_eq!(first.score, 75);
        assert_eq!(first.completion_time, CompletionTime::from_secs(75));
        assert_eq!(first.earned_experience, 30);
    }
}
