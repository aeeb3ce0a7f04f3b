use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use secrecy::{ExposeSecret, Secret};
use sqlx::SqlitePool;

use crate::app::error::AppError;
use crate::telemetry::spawn_blocking_with_tracing;

// Verified against when the username is unknown, so that both failure paths
// cost one argon2 verification. Its parameters must match `Argon2::default()`.
const FALLBACK_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$\
    gZiV/M1gPc22ElAH/Jh1Hw$\
    CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials(e) => {
                tracing::info!(reason = %e, "login rejected");
                AppError::InvalidCredentials
            }
            AuthError::Store(e) => e.into(),
            AuthError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

/// Returns the id of the user owning `credentials`.
#[tracing::instrument(name = "Validate credentials", skip(credentials, pool))]
pub async fn validate_credentials(
    credentials: Credentials,
    pool: &SqlitePool,
) -> Result<i64, AuthError> {
    let mut user_id = None;
    let mut expected_password_hash = Secret::new(FALLBACK_PASSWORD_HASH.to_owned());

    if let Some((stored_user_id, stored_password_hash)) =
        get_stored_credentials(&credentials.username, pool).await?
    {
        user_id = Some(stored_user_id);
        expected_password_hash = stored_password_hash;
    }

    spawn_blocking_with_tracing(move || {
        verify_password_hash(expected_password_hash, credentials.password)
    })
    .await
    .context("Failed to spawn blocking task.")??;

    user_id
        .ok_or_else(|| anyhow::anyhow!("Unknown username."))
        .map_err(AuthError::InvalidCredentials)
}

#[tracing::instrument(name = "Get stored credentials", skip(username, pool))]
async fn get_stored_credentials(
    username: &str,
    pool: &SqlitePool,
) -> Result<Option<(i64, Secret<String>)>, sqlx::Error> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as(r#"SELECT id, password_hash FROM users WHERE username = ?"#)
            .bind(username)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().next().map(|(user_id, password_hash)| (user_id, Secret::new(password_hash))))
}

#[tracing::instrument(name = "Verify password hash", skip(expected_password_hash, password_candidate))]
fn verify_password_hash(
    expected_password_hash: Secret<String>,
    password_candidate: Secret<String>,
) -> Result<(), AuthError> {
    let expected_password_hash = PasswordHash::new(expected_password_hash.expose_secret())
        .map_err(|e| anyhow::anyhow!("Failed to parse hash in PHC string format: {}", e))?;

    Argon2::default()
        .verify_password(
            password_candidate.expose_secret().as_bytes(),
            &expected_password_hash,
        )
        .map_err(|e| anyhow::anyhow!("Invalid password: {}", e))
        .map_err(AuthError::InvalidCredentials)
}

/// Hash `password` with argon2id and a random salt, in PHC string format.
pub fn compute_password_hash(password: Secret<String>) -> anyhow::Result<Secret<String>> {
    let salt = SaltString::generate(rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(Secret::new(password_hash))
}
