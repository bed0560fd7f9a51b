//! Public book catalog routes

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use crate::catalog::Book;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
struct BookDeletedResponse {
    message: String,
    book: Book,
}

/// GET /books
async fn list_books(State(state): State<AppState>) -> Json<Vec<Book>> {
    Json(state.books.list())
}

/// GET /books/{id}
async fn get_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, ApiError> {
    let Path(id) = id?;
    state
        .books
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Book".to_string()))
}

/// POST /books
async fn create_book(
    State(state): State<AppState>,
    book: Result<Json<Book>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let Json(book) = book?;
    if !state.books.insert(book.clone()) {
        return Err(ApiError::BadRequest(format!(
            "Book with id {} already exists",
            book.id
        )));
    }
    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /books/{id}
async fn update_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    book: Result<Json<Book>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Path(id) = id?;
    let Json(book) = book?;
    state
        .books
        .update(id, book)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Book".to_string()))
}

/// DELETE /books/{id}
async fn delete_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookDeletedResponse>, ApiError> {
    let Path(id) = id?;
    let book = state
        .books
        .remove(id)
        .ok_or_else(|| ApiError::NotFound("Book".to_string()))?;

    Ok(Json(BookDeletedResponse {
        message: "Book deleted".to_string(),
        book,
    }))
}

/// Create book routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
}
