use crate::book::{Book, BookId};
use crate::store::Snapshot;

/// Local mirror of the latest pushed snapshot.
///
/// Never edited record by record: every notification replaces the whole
/// contents, so local mutations only show up once the store echoes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalCache {
    books: Vec<Book>,
    generation: u64,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with `snapshot`.
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.books = snapshot.into_books();
        self.generation += 1;
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|book| &book.id == id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// How many snapshots have been applied.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
