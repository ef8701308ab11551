//! Nickname validation for temporary login.

use crate::ValidationError;
use std::fmt;

pub const NICKNAME_MIN_CHARS: usize = 2;
pub const NICKNAME_MAX_CHARS: usize = 10;

/// A trimmed nickname of 2 to 10 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname(String);

impl Nickname {
    /// Trim and validate user input. Length counts characters, not bytes.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();

        if len == 0 {
            return Err(ValidationError::EmptyNickname);
        }
        if len < NICKNAME_MIN_CHARS {
            return Err(ValidationError::NicknameTooShort {
                min: NICKNAME_MIN_CHARS,
            });
        }
        if len > NICKNAME_MAX_CHARS {
            return Err(ValidationError::NicknameTooLong {
                max: NICKNAME_MAX_CHARS,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
