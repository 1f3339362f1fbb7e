//! Filter state - the user's selection criteria, read at render time.

use serde::{Deserialize, Serialize};

use crate::book::{Book, ReadingStatus};

/// Month bucket: everything, or one `YYYY-MM` token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MonthFilter {
    #[default]
    All,
    Month(String),
}

impl MonthFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(token) => book.month() == token,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, MonthFilter::All)
    }
}

impl From<&str> for MonthFilter {
    fn from(token: &str) -> Self {
        match token.trim() {
            "" | "all" => MonthFilter::All,
            other => MonthFilter::Month(other.to_string()),
        }
    }
}

impl From<String> for MonthFilter {
    fn from(token: String) -> Self {
        MonthFilter::from(token.as_str())
    }
}

impl From<MonthFilter> for String {
    fn from(filter: MonthFilter) -> Self {
        match filter {
            MonthFilter::All => "all".to_string(),
            MonthFilter::Month(token) => token,
        }
    }
}

/// Status bucket: everything, or one reading status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Status(ReadingStatus),
}

impl StatusFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Status(status) => book.status() == *status,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, StatusFilter::All)
    }
}

impl From<&str> for StatusFilter {
    fn from(token: &str) -> Self {
        match token.trim() {
            "" | "all" => StatusFilter::All,
            other => StatusFilter::Status(ReadingStatus::from_token(other)),
        }
    }
}

impl From<String> for StatusFilter {
    fn from(token: String) -> Self {
        StatusFilter::from(token.as_str())
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Status(status) => status.token().to_string(),
        }
    }
}

/// Free-text query plus the two categorical filters. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub month: MonthFilter,
    #[serde(default)]
    pub status: StatusFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_month(mut self, month: impl Into<MonthFilter>) -> Self {
        self.month = month.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<StatusFilter>) -> Self {
        self.status = status.into();
        self
    }

    /// The query as matched: trimmed. Empty matches everything.
    pub fn normalized_query(&self) -> &str {
        self.query.trim()
    }

    pub fn has_query(&self) -> bool {
        !self.normalized_query().is_empty()
    }

    /// Whether a month or status bucket is narrowing the list.
    pub fn has_active_filters(&self) -> bool {
        self.month.is_active() || self.status.is_active()
    }

    /// Case-insensitive substring match on title, author or genre.
    pub fn matches_query(&self, book: &Book) -> bool {
        let query = self.normalized_query();
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        [&book.fields.title, &book.fields.author, &book.fields.genre]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// All predicates, conjunctively.
    pub fn matches(&self, book: &Book) -> bool {
        self.month.matches(book) && self.status.matches(book) && self.matches_query(book)
    }

    pub(crate) fn clear_query(&mut self) {
        self.query.clear();
    }
}
