use crate::error::StoreError;
use crate::models::{Book, BookFilter, BookPayload};

mod memory;
mod sqlite;

pub use memory::InMemoryBookStore;
pub use sqlite::SqliteBookStore;

/// Backing store for imported books. Importers only need the lookup and the
/// two writes; the rest is the library surface used by callers.
pub trait BookStore {
    /// Finds the book carrying the given external identity, if any.
    fn find_by_source(
        &self,
        source_connector: &str,
        source_id: &str,
    ) -> Result<Option<Book>, StoreError>;

    /// Stores a new book and returns it with its assigned id.
    fn create(&mut self, payload: &BookPayload) -> Result<Book, StoreError>;

    /// Overwrites every field of an existing book from `payload`.
    fn update(&mut self, id: &str, payload: &BookPayload) -> Result<Book, StoreError>;

    fn get(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Books matching `filter`, most recently updated first.
    fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError>;

    /// Returns false when no book had that id.
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;
}
