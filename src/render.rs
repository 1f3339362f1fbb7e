//! Render reconciler - turns the projected books into display cards.
//!
//! Every change re-renders the whole grid; there is no diffing against the
//! previous pass.

use std::fmt;

use serde::Serialize;

use crate::book::{month_label, Book, BookId, StarRating};
use crate::cache::LocalCache;
use crate::filter::FilterState;
use crate::projection::project;

pub const NO_GENRE: &str = "Genre not specified";

/// What a card shows in the cover slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cover {
    Image { url: String },
    Placeholder,
}

impl Cover {
    pub const PLACEHOLDER_TEXT: &'static str = "No Cover";

    fn from_url(url: &str) -> Self {
        let url = url.trim();
        if url.is_empty() {
            Cover::Placeholder
        } else {
            Cover::Image {
                url: url.to_string(),
            }
        }
    }
}

/// A user action wired to one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", content = "id", rename_all = "snake_case")]
pub enum Intent {
    OpenDetail(BookId),
    Edit(BookId),
    Delete(BookId),
}

impl Intent {
    pub fn book_id(&self) -> &BookId {
        match self {
            Intent::OpenDetail(id) | Intent::Edit(id) | Intent::Delete(id) => id,
        }
    }
}

/// One rendered record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookCard {
    pub id: BookId,
    pub cover: Cover,
    pub stars: StarRating,
    pub star_glyphs: String,
    /// e.g. `"(3.5/5)"`
    pub rating_text: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub status: String,
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

impl BookCard {
    pub fn from_book(book: &Book) -> Self {
        let fields = &book.fields;
        let stars = StarRating::from_rating(fields.rating);
        let genre = fields.genre.trim();
        let review = fields.review.trim();

        Self {
            id: book.id.clone(),
            cover: Cover::from_url(&fields.cover),
            star_glyphs: stars.glyphs(),
            stars,
            rating_text: format!("({}/5)", fields.rating),
            title: fields.title.clone(),
            author: fields.author.clone(),
            genre: if genre.is_empty() {
                NO_GENRE.to_string()
            } else {
                genre.to_string()
            },
            status: fields.status.label().to_string(),
            month: month_label(&fields.month),
            review: (!review.is_empty()).then(|| review.to_string()),
        }
    }

    /// Open detail, edit, delete.
    pub fn intents(&self) -> [Intent; 3] {
        [
            Intent::OpenDetail(self.id.clone()),
            Intent::Edit(self.id.clone()),
            Intent::Delete(self.id.clone()),
        ]
    }
}

/// Why the grid is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmptyState {
    /// The cache itself is empty.
    NoBooks,
    /// Month/status buckets exclude everything.
    NoFilterMatches,
    /// The search query matches nothing.
    NoSearchMatches { query: String },
    /// Query and buckets together match nothing.
    NoMatches { query: String },
}

impl EmptyState {
    fn detect(total: usize, filter: &FilterState) -> Self {
        if total == 0 {
            return EmptyState::NoBooks;
        }
        let query = filter.normalized_query().to_string();
        match (filter.has_query(), filter.has_active_filters()) {
            (true, true) => EmptyState::NoMatches { query },
            (true, false) => EmptyState::NoSearchMatches { query },
            _ => EmptyState::NoFilterMatches,
        }
    }

    pub fn message(&self) -> String {
        match self {
            EmptyState::NoBooks => "No books yet. Add your first book to get started!".to_string(),
            EmptyState::NoFilterMatches => "No books found for the selected filters.".to_string(),
            EmptyState::NoSearchMatches { query } => format!("No books match \"{}\".", query),
            EmptyState::NoMatches { query } => {
                format!("No books match \"{}\" with the selected filters.", query)
            }
        }
    }
}

impl fmt::Display for EmptyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// The full display for one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedGrid {
    pub cards: Vec<BookCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl RenderedGrid {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Project and render in one pass.
pub fn render(cache: &LocalCache, filter: &FilterState) -> RenderedGrid {
    render_books(&project(cache, filter), cache.len(), filter)
}

/// Render already-projected books; `total` is the unfiltered cache size.
pub fn render_books(visible: &[Book], total: usize, filter: &FilterState) -> RenderedGrid {
    let cards: Vec<BookCard> = visible.iter().map(BookCard::from_book).collect();
    let empty = cards
        .is_empty()
        .then(|| EmptyState::detect(total, filter));
    RenderedGrid {
        empty_message: empty.as_ref().map(EmptyState::message),
        cards,
        empty,
    }
}
