//! Person Name Value Object
//!
//! Optional first/last name shown next to the user name. Free-form text,
//! trimmed, non-empty, at most 50 characters, no control characters.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub const PERSON_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonNameError {
    #[error("Name cannot be empty")]
    Empty,
    #[error("Name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },
    #[error("Name contains a control character")]
    ControlCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, PersonNameError> {
        let name = input.as_ref().trim();
        if name.is_empty() {
            return Err(PersonNameError::Empty);
        }

        let length = name.chars().count();
        if length > PERSON_NAME_MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                length,
                max: PERSON_NAME_MAX_LENGTH,
            });
        }
        if name.chars().any(char::is_control) {
            return Err(PersonNameError::ControlCharacter);
        }

        Ok(Self(name.to_string()))
    }

    /// Blank input means "not given"
    pub fn optional(input: Option<&str>) -> Result<Option<Self>, PersonNameError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => Self::new(name).map(Some),
        }
    }

    /// Rebuild from a stored value (validated on the way in)
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_keeps_unicode() {
        let name = PersonName::new("  José María ").unwrap();
        assert_eq!(name.as_str(), "José María");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(PersonName::new("  "), Err(PersonNameError::Empty));
        assert_eq!(
            PersonName::new("x".repeat(51)),
            Err(PersonNameError::TooLong { length: 51, max: 50 })
        );
        assert_eq!(
            PersonName::new("Ann\u{0007}"),
            Err(PersonNameError::ControlCharacter)
        );
    }

    #[test]
    fn test_optional_blank_is_absent() {
        assert_eq!(PersonName::optional(None), Ok(None));
        assert_eq!(PersonName::optional(Some("   ")), Ok(None));
        assert_eq!(
            PersonName::optional(Some("Ivan")).unwrap().map(|n| n.to_string()),
            Some("Ivan".to_string())
        );
    }
}
