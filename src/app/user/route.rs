use anyhow::Context;
use axum::extract::State;
use axum::Json;
use secrecy::{ExposeSecret, Secret};
use sqlx::SqlitePool;

use super::auth::{compute_password_hash, validate_credentials, Credentials};
use super::schema::{
    CreateUserRequestBody, CreateUserResponseBody, LoginUserRequestBody, LoginUserResponseBody,
};
use crate::app::error::{AppError, AppResult};
use crate::app::AppState;
use crate::domain::user::NewUser;
use crate::telemetry::spawn_blocking_with_tracing;

#[tracing::instrument(name = "Create new user", skip(state, body), fields(username = %body.username))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequestBody>,
) -> AppResult<Json<CreateUserResponseBody>> {
    let NewUser { username, password } = NewUser::try_from(body)?;

    let password = password.into_secret();
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("Could not compute password hash.")??;

    let user_id = insert_user(&state.db, username.as_ref(), &password_hash).await?;

    Ok(Json(CreateUserResponseBody {
        id: user_id,
        username: username.to_string(),
    }))
}

#[tracing::instrument(skip(state, body), fields(username=tracing::field::Empty, user_id=tracing::field::Empty))]
pub async fn login_user(
    State(state): State<AppState>,
    Json(body): Json<LoginUserRequestBody>,
) -> AppResult<Json<LoginUserResponseBody>> {
    let credentials = Credentials {
        username: body.username,
        password: Secret::new(body.password),
    };
    let username = credentials.username.clone();
    tracing::Span::current().record("username", &tracing::field::display(&username));

    let user_id = validate_credentials(credentials, &state.db).await?;
    tracing::Span::current().record("user_id", &tracing::field::display(&user_id));

    Ok(Json(LoginUserResponseBody {
        token: state.tokens.issue(&username),
    }))
}

#[tracing::instrument(name = "Insert new user", skip(db, password_hash))]
async fn insert_user(
    db: &SqlitePool,
    username: &str,
    password_hash: &Secret<String>,
) -> AppResult<i64> {
    let ids: Vec<i64> = sqlx::query_scalar(
        r#"INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING id"#,
    )
    .bind(username)
    .bind(password_hash.expose_secret())
    // `fetch_all` steps the statement to completion so the insert is committed
    // before we answer.
    .fetch_all(db)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
            AppError::Conflict(format!("Username `{}` is already taken.", username))
        }
        e => {
            tracing::error!(detail = e.to_string(), "failed to save new user");
            AppError::from(e)
        }
    })?;

    ids.into_iter()
        .next()
        .ok_or_else(|| AppError::from(sqlx::Error::RowNotFound))
}
