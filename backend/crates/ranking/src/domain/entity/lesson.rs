//! Lesson Entity

use chrono::{DateTime, Utc};
use kernel::id::LessonId;
use serde::Serialize;

use crate::domain::value_object::LessonMode;

/// A lesson of some type and level, in one of two difficulty modes.
///
/// `content` is an opaque document; its shape varies per lesson type and
/// nothing in ranking reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub lesson_id: LessonId,
    pub lesson_type: String,
    pub level: u32,
    pub mode: LessonMode,
    /// Experience a completion is worth unless the caller says otherwise
    pub xp: u32,
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(
        lesson_type: impl Into<String>,
        level: u32,
        mode: LessonMode,
        xp: u32,
        content: serde_json::Value,
    ) -> Self {
        let now = Utc::now();

        Self {
            lesson_id: LessonId::new(),
            lesson_type: lesson_type.into(),
            level,
            mode,
            xp,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One level of a lesson type with both of its mode variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonLevel {
    pub level: u32,
    pub easy_id: LessonId,
    pub hard_id: LessonId,
}
