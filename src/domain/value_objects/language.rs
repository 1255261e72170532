//! Course language code.
//!
//! Courses carry a two-letter language code (`en`, `id`, `ja`, ...). The code
//! is stored lowercase in a `VARCHAR(2)` column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Two-letter course language code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

/// Raised when a string is not a two-letter language code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid language code {0:?}: expected two ASCII letters")]
pub struct InvalidLanguage(pub String);

impl Language {
    /// Parse and normalize a language code.
    pub fn parse(code: &str) -> Result<Self, InvalidLanguage> {
        let trimmed = code.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(InvalidLanguage(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// English is the catalog's default language.
impl Default for Language {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl FromStr for Language {
    type Err = InvalidLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Language {
    type Error = InvalidLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
