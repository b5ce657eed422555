use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::{AppError, Envelope};
use serde::Serialize;

use super::models::{Book, BookBrief, BookFilter, BookPayload, ValidationError};
use super::registry::{BookError, BookRegistry};

type Books = State<Arc<BookRegistry>>;

/// Routes for the books module, relative to its mount point.
pub fn router(books: Arc<BookRegistry>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(books)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBook {
    pub book_id: String,
}

#[derive(Debug, Serialize)]
pub struct BookList {
    pub books: Vec<BookBrief>,
}

#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub book: Book,
}

/// Operation a failure message is phrased for
#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    fn failure(self) -> &'static str {
        match self {
            Action::Add => "Failed to add book",
            Action::Update => "Failed to update book",
            Action::Delete => "Failed to delete book",
        }
    }

    fn reject(self, err: BookError) -> AppError {
        let prefix = self.failure();
        match err {
            BookError::Validation(ValidationError::MissingName) => {
                AppError::validation(format!("{}. Please provide the book name", prefix))
            }
            BookError::Validation(ValidationError::PageOverflow { .. }) => AppError::validation(
                format!("{}. readPage cannot be greater than pageCount", prefix),
            ),
            BookError::NotFound { .. } => AppError::not_found(format!("{}. Id not found", prefix)),
        }
    }

    fn malformed(self, rejection: JsonRejection) -> AppError {
        AppError::bad_request(format!("{}. {}", self.failure(), rejection.body_text()))
    }
}

async fn create_book(
    State(books): Books,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<CreatedBook>>), AppError> {
    let Json(payload) = payload.map_err(|rejection| Action::Add.malformed(rejection))?;
    let book_id = books
        .create(payload)
        .map_err(|err| Action::Add.reject(err))?;

    tracing::info!(book_id = %book_id, "book added");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success_with_message(
            "Book added successfully",
            CreatedBook { book_id },
        )),
    ))
}

async fn list_books(
    State(books): Books,
    filter: Result<Query<BookFilter>, QueryRejection>,
) -> Result<Json<Envelope<BookList>>, AppError> {
    let Query(filter) = filter
        .map_err(|rejection| AppError::bad_request(format!("Invalid query: {}", rejection.body_text())))?;

    let books = books.list(&filter);
    Ok(Json(Envelope::success(BookList { books })))
}

async fn get_book(
    State(books): Books,
    Path(id): Path<String>,
) -> Result<Json<Envelope<BookDetail>>, AppError> {
    let book = books.get(&id).map_err(|err| match err {
        BookError::NotFound { .. } => AppError::not_found("Book not found"),
        other => AppError::Internal(other.into()),
    })?;

    Ok(Json(Envelope::success(BookDetail { book })))
}

async fn update_book(
    State(books): Books,
    Path(id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let Json(payload) = payload.map_err(|rejection| Action::Update.malformed(rejection))?;
    books
        .update(&id, payload)
        .map_err(|err| Action::Update.reject(err))?;

    tracing::info!(book_id = %id, "book updated");
    Ok(Json(Envelope::message("Book updated successfully")))
}

async fn delete_book(
    State(books): Books,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    books.delete(&id).map_err(|err| Action::Delete.reject(err))?;

    tracing::info!(book_id = %id, "book deleted");
    Ok(Json(Envelope::message("Book deleted successfully")))
}
