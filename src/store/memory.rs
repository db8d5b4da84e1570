use super::BookStore;
use crate::error::StoreError;
use crate::models::{Book, BookFilter, BookPayload};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Process-local store keyed by book id, with an index on external identity.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: HashMap<String, Book>,
    by_source: HashMap<(String, String), String>,
    order: Vec<String>,
    writes: u64,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Number of successful create/update/delete calls.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// All books carrying the given external id, across every connector.
    pub fn books_with_source_id(&self, source_id: &str) -> Vec<&Book> {
        self.order
            .iter()
            .filter_map(|id| self.books.get(id))
            .filter(|book| book.source_id == source_id)
            .collect()
    }
}

impl BookStore for InMemoryBookStore {
    fn find_by_source(
        &self,
        source_connector: &str,
        source_id: &str,
    ) -> Result<Option<Book>, StoreError> {
        let key = (source_connector.to_string(), source_id.to_string());
        Ok(self
            .by_source
            .get(&key)
            .and_then(|id| self.books.get(id))
            .cloned())
    }

    fn create(&mut self, payload: &BookPayload) -> Result<Book, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let book = Book::from_payload(id.clone(), payload, now, now);
        self.by_source.insert(
            (payload.source_connector.clone(), payload.source_id.clone()),
            id.clone(),
        );
        self.books.insert(id.clone(), book.clone());
        self.order.push(id);
        self.writes += 1;
        Ok(book)
    }

    fn update(&mut self, id: &str, payload: &BookPayload) -> Result<Book, StoreError> {
        let existing = self
            .books
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let old_key = (
            existing.source_connector.clone(),
            existing.source_id.clone(),
        );
        let book = Book::from_payload(id.to_string(), payload, existing.created_at, Utc::now());

        self.by_source.remove(&old_key);
        self.by_source.insert(
            (payload.source_connector.clone(), payload.source_id.clone()),
            id.to_string(),
        );
        self.books.insert(id.to_string(), book.clone());
        self.writes += 1;
        Ok(book)
    }

    fn get(&self, id: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.books.get(id).cloned())
    }

    fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError> {
        let mut books = self
            .order
            .iter()
            .filter_map(|id| self.books.get(id))
            .filter(|book| filter.matches(book))
            .cloned()
            .collect::<Vec<_>>();
        books.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        if let Some(limit) = filter.limit {
            books.truncate(limit);
        }
        Ok(books)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(book) = self.books.remove(id) else {
            return Ok(false);
        };
        self.by_source
            .remove(&(book.source_connector, book.source_id));
        self.order.retain(|existing| existing != id);
        self.writes += 1;
        Ok(true)
    }
}
