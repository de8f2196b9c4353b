//! Domain DTOs for the book API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! `id` is a plain string rather than a `Uuid`: identity is assigned by the
//! server and the client never interprets it. A book that has not been
//! created yet carries an empty id, which is omitted from the JSON body.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest and highest publication year a form should accept.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// A single book record as exchanged with the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl Book {
    /// A book that has not been assigned an id yet.
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Returns this book with `id` set, for updates of an existing record.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Form-level checks a UI can run before submitting.
    ///
    /// The server remains the source of truth; the client never calls this
    /// implicitly.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if self.year == 0 {
            return Err(ValidationError::MissingYear);
        }
        if !YEAR_RANGE.contains(&self.year) {
            return Err(ValidationError::YearOutOfRange(self.year));
        }
        Ok(())
    }
}
