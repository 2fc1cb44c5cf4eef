use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const NOTE_EXTENSION: &str = ".md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("name has leading or trailing whitespace")]
    Padded,
    #[error("name contains a path separator")]
    Separator,
    #[error("name starts with a dot")]
    Hidden,
    #[error("name contains control characters")]
    Control,
}

/// File name of a note inside the store root, always ending in `.md`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteName(String);

impl NoteName {
    /// Validates `raw` and appends the `.md` suffix when it is missing.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }
        if trimmed.len() != raw.len() {
            return Err(NameError::Padded);
        }
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(NameError::Separator);
        }
        if trimmed.starts_with('.') {
            return Err(NameError::Hidden);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(NameError::Control);
        }

        let mut name = trimmed.to_string();
        if !name.ends_with(NOTE_EXTENSION) {
            name.push_str(NOTE_EXTENSION);
        }
        Ok(Self(name))
    }

    pub fn generate() -> Self {
        let mut buf = Uuid::encode_buffer();
        let id = Uuid::new_v4().hyphenated().encode_upper(&mut buf);
        Self(format!("{id}{NOTE_EXTENSION}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for directory entries the store lists as notes: the file name
    /// must already be in normalized form.
    pub fn is_listable(file_name: &str) -> bool {
        file_name.ends_with(NOTE_EXTENSION)
            && Self::parse(file_name).is_ok_and(|name| name.as_str() == file_name)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NoteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub name: NoteName,
    pub content: String,
}
