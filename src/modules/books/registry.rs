//! In-memory Book Registry.
//!
//! Records live in insertion order inside a single `Vec`. One mutex guards
//! the whole sequence and is held for the full duration of each operation,
//! so every operation is atomic with respect to the others.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::models::{Book, BookBrief, BookFilter, BookPayload, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("book '{id}' not found")]
    NotFound { id: String },
}

impl BookError {
    fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}

#[derive(Debug, Default)]
pub struct BookRegistry {
    books: Mutex<Vec<Book>>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Every operation leaves the Vec consistent, so a poisoned lock is safe to reuse.
    fn books(&self) -> MutexGuard<'_, Vec<Book>> {
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and append a new book, returning its generated id.
    pub fn create(&self, payload: BookPayload) -> Result<String, BookError> {
        let fields = payload.validate()?;
        let id = Uuid::new_v4().to_string();
        let book = Book::new(id.clone(), fields, OffsetDateTime::now_utc());

        self.books().push(book);
        tracing::debug!(book_id = %id, "book created");
        Ok(id)
    }

    /// Brief projections of every book matching `filter`, in insertion order.
    pub fn list(&self, filter: &BookFilter) -> Vec<BookBrief> {
        self.books()
            .iter()
            .filter(|book| filter.matches(book))
            .map(Book::brief)
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<Book, BookError> {
        self.books()
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| BookError::not_found(id))
    }

    /// Replace every mutable field of an existing book.
    ///
    /// The payload is validated before the id is looked up, so an invalid
    /// body is reported as a validation failure even for an unknown id.
    pub fn update(&self, id: &str, payload: BookPayload) -> Result<(), BookError> {
        let fields = payload.validate()?;

        let mut books = self.books();
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| BookError::not_found(id))?;
        book.apply(fields, OffsetDateTime::now_utc());

        tracing::debug!(book_id = %id, "book updated");
        Ok(())
    }

    /// Remove a book and hand back the removed record.
    pub fn delete(&self, id: &str) -> Result<Book, BookError> {
        let mut books = self.books();
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| BookError::not_found(id))?;
        let book = books.remove(index);

        tracing::debug!(book_id = %id, "book deleted");
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.books().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books().is_empty()
    }
}
