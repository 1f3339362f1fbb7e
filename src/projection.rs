//! View projection - which books to show, in which order.
//!
//! A pure function of the local cache and the filter state; running it twice
//! on the same inputs gives the same ordered result.

use crate::book::Book;
use crate::cache::LocalCache;
use crate::filter::FilterState;

/// Filter the cache by every active predicate and sort by month token, newest first.
///
/// Month tokens are zero-padded `YYYY-MM`, so comparing them as strings is
/// chronological. Books sharing a month keep the cache's order.
pub fn project(cache: &LocalCache, filter: &FilterState) -> Vec<Book> {
    project_books(cache.books(), filter)
}

/// [`project`] over a plain slice.
pub fn project_books(books: &[Book], filter: &FilterState) -> Vec<Book> {
    let mut visible: Vec<Book> = books
        .iter()
        .filter(|book| filter.matches(book))
        .cloned()
        .collect();
    visible.sort_by(|a, b| b.month().cmp(a.month()));
    visible
}

/// Distinct month tokens present in the cache, newest first; feeds the month picker.
pub fn month_options(cache: &LocalCache) -> Vec<String> {
    let mut months: Vec<String> = cache
        .books()
        .iter()
        .map(|book| book.month().to_string())
        .filter(|month| !month.is_empty())
        .collect();
    months.sort_by(|a, b| b.cmp(a));
    months.dedup();
    months
}
