use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty variant of a lesson level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonMode {
    Easy,
    Hard,
}

impl LessonMode {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            LessonMode::Easy => "easy",
            LessonMode::Hard => "hard",
        }
    }

    /// Unknown codes are `None`; callers decide whether to skip or fail.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "easy" => Some(LessonMode::Easy),
            "hard" => Some(LessonMode::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for LessonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
