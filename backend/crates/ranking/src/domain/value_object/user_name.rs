//! User Name Value Object
//!
//! The public handle shown on leaderboards.
//!
//! ## Invariants
//! - Length: 3 to 30 characters (after trimming)
//! - ASCII letters, digits and `_ . -` only
//! - Starts with a letter or digit
//! - Uniqueness is checked on the lowercase canonical form

use serde::{Deserialize, Serialize};
use std::fmt;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char, position: usize },
    InvalidStart { char: char },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "User name is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => write!(
                f,
                "Invalid character '{char}' at position {position}. Only a-z, 0-9, _, ., - are allowed"
            ),
            Self::InvalidStart { char } => write!(
                f,
                "User name cannot start with '{char}'. Must start with a letter or digit"
            ),
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated user name
///
/// `original` keeps the user's casing for display, `canonical` is the
/// lowercase form used for uniqueness and lookups.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = input.as_ref().trim().to_string();
        Self::validate(&original)?;
        let canonical = original.to_ascii_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Rebuild from a stored value (validated on the way in)
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_ascii_lowercase(),
        }
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        let Some(first) = name.chars().next() else {
            return Err(UserNameError::Empty);
        };

        let length = name.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some((position, char)) = name
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_alphanumeric() && !ALLOWED_SPECIAL_CHARS.contains(c))
        {
            return Err(UserNameError::InvalidCharacter { char, position });
        }

        if !first.is_ascii_alphanumeric() {
            return Err(UserNameError::InvalidStart { char: first });
        }

        Ok(())
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.original
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserName({})", self.original)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        let name = UserName::new("  Anna_K.92 ").unwrap();
        assert_eq!(name.original(), "Anna_K.92");
        assert_eq!(name.canonical(), "anna_k.92");
        assert!(UserName::new("abc").is_ok());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_length_limits() {
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
        assert_eq!(
            UserName::new("ab"),
            Err(UserNameError::TooShort { length: 2, min: 3 })
        );
        assert!(matches!(
            UserName::new("a".repeat(31)),
            Err(UserNameError::TooLong { length: 31, .. })
        ));
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            UserName::new("bad name"),
            Err(UserNameError::InvalidCharacter {
                char: ' ',
                position: 3
            })
        );
        assert!(UserName::new("héllo").is_err());
        assert_eq!(
            UserName::new("_hidden"),
            Err(UserNameError::InvalidStart { char: '_' })
        );
    }

    #[test]
    fn test_serde_validates() {
        let name: UserName = serde_json::from_str("\"Mike\"").unwrap();
        assert_eq!(name.to_string(), "Mike");
        assert!(serde_json::from_str::<UserName>("\"x\"").is_err());
    }
}
