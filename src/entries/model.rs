use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::postgres::schema::TITLE_MAX_CHARS;

/// A stored entry, serialized as its public attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating or replacing an entry.
///
/// Missing fields deserialize as empty strings so that they are reported by
/// [`EntryInput::validate`] rather than by the JSON extractor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryValidationError {
    #[error("Title and content are required")]
    MissingField,

    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },
}

impl EntryInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.title.is_empty() || self.content.is_empty() {
            return Err(EntryValidationError::MissingField);
        }
        if self.title.chars().count() > TITLE_MAX_CHARS {
            return Err(EntryValidationError::TitleTooLong {
                max: TITLE_MAX_CHARS,
            });
        }
        Ok(())
    }
}
