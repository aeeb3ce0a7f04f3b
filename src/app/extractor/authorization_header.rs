use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::app::error::AppError;
use crate::app::extractor::AuthUser;
use crate::app::AppState;

#[async_trait]
impl FromRequestParts<AppState> for AuthUser
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the value of the `Authorization` header, if it was sent at all.
        let auth_header: TypedHeader<Authorization<Bearer>> =
            TypedHeader::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::Unauthorized("Missing Authorization header.".to_owned())
                    } else {
                        AppError::Unauthorized(
                            "Authorization header must use the Bearer scheme.".to_owned(),
                        )
                    }
                })?;

        let session = state
            .tokens
            .authenticate(auth_header.token())
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}.", e)))?;

        tracing::debug!(username = %session.username, "authenticated request");

        Ok(Self {
            username: session.username,
        })
    }
}
