use axum::{routing::post, Router};

use super::AppState;

pub mod auth;
pub mod route;
pub mod schema;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/create", post(route::create_user))
        .route("/users/login", post(route::login_user))
}
