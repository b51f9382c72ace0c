//! Lesson completion time

use serde::{Deserialize, Serialize};
use std::fmt;

/// Elapsed seconds spent on a lesson. Displays as `MM:SS`, or `HH:MM:SS`
/// from one hour up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionTime(u32);

impl CompletionTime {
    /// Largest time a result may record (the store keeps seconds in a signed 32-bit column)
    pub const MAX_SECS: u32 = i32::MAX as u32;

    #[inline]
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    #[inline]
    pub const fn as_secs(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_recordable(&self) -> bool {
        self.0 <= Self::MAX_SECS
    }

    /// Formats fractional averages the same way, rounding to whole seconds
    pub fn format_secs(secs: f64) -> String {
        let rounded = secs.max(0.0).round().min(f64::from(u32::MAX)) as u32;
        Self(rounded).to_string()
    }
}

impl fmt::Display for CompletionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        if hours > 0 {
            write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{minutes:02}:{seconds:02}")
        }
    }
}
