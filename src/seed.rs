use crate::book::{BookFields, ReadingStatus};
use crate::error::StoreError;
use crate::store::RecordStore;

/// The two starter records a fresh shelf is shown with.
pub fn sample_books() -> Vec<BookFields> {
    vec![
        BookFields::new("The Housemaid", "Freida McFadden")
            .with_rating(4.0)
            .with_genre("Thriller")
            .with_status(ReadingStatus::Finished)
            .with_month("2025-01")
            .with_review(
                "A gripping psychological thriller that kept me guessing until the end. Great plot twists!",
            ),
        BookFields::new("Lessons in Chemistry", "Bonnie Garmus")
            .with_rating(5.0)
            .with_genre("Historical Fiction")
            .with_status(ReadingStatus::Finished)
            .with_month("2025-01")
            .with_review(
                "Brilliant and witty story about a female scientist in the 1960s. Absolutely loved Elizabeth Zott's character.",
            ),
    ]
}

/// Insert the sample books if the store is empty. Returns how many were added.
pub fn seed_if_empty(store: &dyn RecordStore) -> Result<usize, StoreError> {
    if !store.snapshot()?.is_empty() {
        return Ok(0);
    }
    let books = sample_books();
    let count = books.len();
    for fields in books {
        store.insert(fields)?;
    }
    tracing::info!(count, "seeded sample books");
    Ok(count)
}
