use axum::{
    routing::{get, post},
    Router,
};

use super::AppState;

pub mod route;
pub mod schema;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books/add", post(route::add_book))
        .route("/books/get", get(route::list_books))
        .route("/books/", get(route::search_books))
        .route(
            "/books/:id",
            get(route::get_book)
                .put(route::update_book)
                .delete(route::delete_book),
        )
}
