use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Urgency letter of a task, `A` (highest) through `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Priority(char);

/// Error returned when a priority token is not a single letter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid priority '{0}': expected a single letter A-Z")]
pub struct PriorityParseError(pub String);

impl Priority {
    /// Build a priority from a letter. Lowercase input is normalized to uppercase.
    ///
    /// # Errors
    /// Returns [`PriorityParseError`] when `letter` is not an ASCII letter.
    pub fn new(letter: char) -> Result<Self, PriorityParseError> {
        if letter.is_ascii_alphabetic() {
            Ok(Self(letter.to_ascii_uppercase()))
        } else {
            Err(PriorityParseError(letter.to_string()))
        }
    }

    /// The uppercase letter.
    #[must_use]
    pub const fn letter(self) -> char {
        self.0
    }

    /// The `(P) ` prefix written in front of a task body.
    #[must_use]
    pub fn prefix(self) -> String {
        format!("({}) ", self.0)
    }

    /// Read the priority encoded at the very start of `body`, returning it together
    /// with the remainder of the body. Only the exact uppercase form `(P) ` counts.
    #[must_use]
    pub fn split_prefix(body: &str) -> (Option<Self>, &str) {
        match body.as_bytes() {
            [b'(', letter @ b'A'..=b'Z', b')', b' ', ..] => (Some(Self(char::from(*letter))), &body[4..]),
            _ => (None, body),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::new(letter).map_err(|_| PriorityParseError(s.to_owned())),
            _ => Err(PriorityParseError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = PriorityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.0.to_string()
    }
}
