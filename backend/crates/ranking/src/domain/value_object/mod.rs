//! Value Object Module

pub mod completion_time;
pub mod lesson_mode;
pub mod period;
pub mod person_name;
pub mod trend;
pub mod user_name;

pub use completion_time::CompletionTime;
pub use lesson_mode::LessonMode;
pub use period::{Period, PeriodBounds, UnknownPeriod};
pub use person_name::{PersonName, PersonNameError};
pub use trend::Trend;
pub use user_name::{UserName, UserNameError};
