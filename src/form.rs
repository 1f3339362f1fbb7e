//! Entry form - raw field capture for adding and editing books.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::book::{Book, BookFields, ReadingStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A required field was left blank.
    Missing(&'static str),
    /// The rating field is not a number.
    InvalidRating(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Missing(field) => write!(f, "{} is required", field),
            FormError::InvalidRating(raw) => write!(f, "rating is not a number: {}", raw),
        }
    }
}

impl std::error::Error for FormError {}

/// Text as typed into the entry form, every field a string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryForm {
    pub title: String,
    pub author: String,
    pub rating: String,
    pub genre: String,
    pub status: String,
    pub month: String,
    pub cover: String,
    pub review: String,
}

impl EntryForm {
    /// Prefill from an existing record (edit mode).
    pub fn from_book(book: &Book) -> Self {
        Self::from(&book.fields)
    }

    /// Trim, check presence of title and author, and parse the rating.
    ///
    /// Nothing else is validated: out-of-range ratings and odd month tokens
    /// go through as typed.
    pub fn to_fields(&self) -> Result<BookFields, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::Missing("title"));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(FormError::Missing("author"));
        }

        let raw_rating = self.rating.trim();
        let rating = if raw_rating.is_empty() {
            0.0
        } else {
            raw_rating
                .parse::<f64>()
                .map_err(|_| FormError::InvalidRating(raw_rating.to_string()))?
        };

        Ok(BookFields {
            title: title.to_string(),
            author: author.to_string(),
            rating,
            genre: self.genre.trim().to_string(),
            status: ReadingStatus::from_token(&self.status),
            month: self.month.trim().to_string(),
            cover: self.cover.trim().to_string(),
            review: self.review.trim().to_string(),
        })
    }
}

impl From<&BookFields> for EntryForm {
    fn from(fields: &BookFields) -> Self {
        Self {
            title: fields.title.clone(),
            author: fields.author.clone(),
            rating: fields.rating.to_string(),
            genre: fields.genre.clone(),
            status: match fields.status {
                ReadingStatus::Unknown => String::new(),
                status => status.token().to_string(),
            },
            month: fields.month.clone(),
            cover: fields.cover.clone(),
            review: fields.review.clone(),
        }
    }
}
