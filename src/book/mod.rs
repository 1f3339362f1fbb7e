//! Book records - the data model shared by the store, projection, and renderer.
//!
//! A [`Book`] is what the record store hands back: the user-entered
//! [`BookFields`] plus the identifier and timestamps the store assigns.
//! Nothing here validates beyond what the entry form checks; malformed
//! optional values are carried through and given fallback display text.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Opaque record identifier assigned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        BookId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        BookId(value.to_string())
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        BookId(value)
    }
}

/// Reading status bucket.
///
/// Unrecognised tokens deserialize to `Unknown` instead of failing the
/// whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReadingStatus {
    #[serde(rename = "to-read")]
    ToRead,
    #[serde(rename = "reading")]
    Reading,
    #[serde(rename = "finished")]
    Finished,
    #[default]
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl ReadingStatus {
    /// Parse a status token, falling back to `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "to-read" => ReadingStatus::ToRead,
            "reading" => ReadingStatus::Reading,
            "finished" => ReadingStatus::Finished,
            _ => ReadingStatus::Unknown,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "to-read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Finished => "finished",
            ReadingStatus::Unknown => "unknown",
        }
    }

    /// Human-facing label shown on a card.
    pub fn label(&self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "To Read",
            ReadingStatus::Reading => "Currently Reading",
            ReadingStatus::Finished => "Finished",
            ReadingStatus::Unknown => "unknown status",
        }
    }
}

/// The user-editable part of a record, exactly as submitted through the entry form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub status: ReadingStatus,
    /// Year-month token, e.g. `"2025-01"`.
    #[serde(default)]
    pub month: String,
    /// Cover image URL; empty means no cover.
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub review: String,
}

impl BookFields {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            rating: 0.0,
            genre: String::new(),
            status: ReadingStatus::Unknown,
            month: String::new(),
            cover: String::new(),
            review: String::new(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_status(mut self, status: ReadingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month = month.into();
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = cover.into();
        self
    }

    pub fn with_review(mut self, review: impl Into<String>) -> Self {
        self.review = review.into();
        self
    }
}

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    pub fields: BookFields,
    /// Assigned by the store on insert; the snapshot sort key.
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn author(&self) -> &str {
        &self.fields.author
    }

    pub fn month(&self) -> &str {
        &self.fields.month
    }

    pub fn status(&self) -> ReadingStatus {
        self.fields.status
    }
}

/// A parsed `YYYY-MM` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Parse a zero-padded `YYYY-MM` token. Returns `None` for anything else.
    pub fn parse(token: &str) -> Option<Self> {
        let (year, month) = token.trim().split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn token(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Expanded label, e.g. `"January 2025"`.
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%B %Y").to_string(),
            None => self.token(),
        }
    }
}

/// Label for a raw month token; malformed tokens are shown verbatim.
pub fn month_label(token: &str) -> String {
    match YearMonth::parse(token) {
        Some(ym) => ym.label(),
        None => token.to_string(),
    }
}

/// Star-glyph encoding of a rating.
///
/// Only an exact `.5` fraction earns a half glyph; `3.3` renders as three
/// full stars with no half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarRating {
    pub full: u8,
    pub half: bool,
}

impl StarRating {
    pub const FULL_GLYPH: char = '★';
    pub const HALF_GLYPH: char = '½';

    pub fn from_rating(rating: f64) -> Self {
        if !rating.is_finite() || rating <= 0.0 {
            return Self {
                full: 0,
                half: false,
            };
        }
        let rating = rating.min(5.0);
        let floor = rating.floor();
        Self {
            full: floor as u8,
            half: rating - floor == 0.5,
        }
    }

    pub fn glyphs(&self) -> String {
        let mut out: String = std::iter::repeat(Self::FULL_GLYPH)
            .take(self.full as usize)
            .collect();
        if self.half {
            out.push(Self::HALF_GLYPH);
        }
        out
    }
}
