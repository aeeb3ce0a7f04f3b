use axum::extract::{Path, Query, State};
use axum::Json;
use sqlx::SqlitePool;
use tracing::instrument;

use super::schema::{Book, BookRequestBody, PageParams, SearchParams};
use crate::app::error::{AppError, AppResult};
use crate::app::extractor::AuthUser;
use crate::app::AppState;
use crate::domain::book::NewBook;

#[instrument(name = "Add a new book", skip(user, state, body), fields(username = %user.username))]
pub async fn add_book(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<BookRequestBody>,
) -> AppResult<Json<Book>> {
    let book = NewBook::try_from(body)?;
    let book = insert_book(&state.db, &book).await?;
    tracing::info!(book_id = book.id, "book added");

    Ok(Json(book))
}

#[instrument(name = "List books", skip(user, state), fields(username = %user.username))]
pub async fn list_books(
    user: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Vec<Book>>> {
    let books = sqlx::query_as::<_, Book>(
        r#"SELECT id, title, author, description FROM books ORDER BY id LIMIT ? OFFSET ?"#,
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(books))
}

/// Case-insensitive substring search; both filters must match when both are given.
#[instrument(name = "Search books", skip(user, state), fields(username = %user.username))]
pub async fn search_books(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Book>>> {
    let books = sqlx::query_as::<_, Book>(
        r#"
        SELECT id, title, author, description
        FROM books
        WHERE (?1 IS NULL OR instr(lower(title), lower(?1)) > 0)
          AND (?2 IS NULL OR instr(lower(author), lower(?2)) > 0)
        ORDER BY id
        "#,
    )
    .bind(params.title)
    .bind(params.author)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(books))
}

#[instrument(name = "Get a book", skip(user, state), fields(username = %user.username))]
pub async fn get_book(
    user: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Book>> {
    sqlx::query_as::<_, Book>(
        r#"SELECT id, title, author, description FROM books WHERE id = ?"#,
    )
    .bind(book_id)
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .next()
    .map(Json)
    .ok_or(AppError::NotFound("Book"))
}

#[instrument(name = "Update a book", skip(user, state, body), fields(username = %user.username))]
pub async fn update_book(
    user: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Json(body): Json<BookRequestBody>,
) -> AppResult<Json<Book>> {
    let book = NewBook::try_from(body)?;

    sqlx::query_as::<_, Book>(
        r#"
        UPDATE books SET title = ?, author = ?, description = ?
        WHERE id = ?
        RETURNING id, title, author, description
        "#,
    )
    .bind(book.title.as_ref())
    .bind(book.author.as_ref())
    .bind(book.description.as_deref())
    .bind(book_id)
    // Stepping a `RETURNING` statement to completion is what commits it.
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .next()
    .map(Json)
    .ok_or(AppError::NotFound("Book"))
}

#[instrument(name = "Delete a book", skip(user, state), fields(username = %user.username))]
pub async fn delete_book(
    user: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Book>> {
    let deleted = sqlx::query_as::<_, Book>(
        r#"DELETE FROM books WHERE id = ? RETURNING id, title, author, description"#,
    )
    .bind(book_id)
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .next()
    .ok_or(AppError::NotFound("Book"))?;
    tracing::info!(book_id = deleted.id, "book deleted");

    Ok(Json(deleted))
}

#[instrument(name = "Insert new book", skip(db, book), fields(title = %book.title, author = %book.author))]
async fn insert_book(db: &SqlitePool, book: &NewBook) -> Result<Book, sqlx::Error> {
    sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (title, author, description) VALUES (?, ?, ?)
        RETURNING id, title, author, description
        "#,
    )
    .bind(book.title.as_ref())
    .bind(book.author.as_ref())
    .bind(book.description.as_deref())
    .fetch_all(db)
    .await
    .map_err(|e| {
        tracing::error!(detail = e.to_string(), "failed to save new book");
        e
    })?
    .into_iter()
    .next()
    .ok_or(sqlx::Error::RowNotFound)
}
