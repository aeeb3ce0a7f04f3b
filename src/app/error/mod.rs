use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

mod schema;

pub type AppResult<T, E = AppError> = std::result::Result<T, E>;

/// A common error type that can be used throughout the API.
///
/// Can be returned in a `Result` from an API handler function. Every variant maps to
/// a status code and a JSON body; internal details are logged, never sent to the client.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("The data store is unavailable.")]
    StoreUnavailable(#[source] sqlx::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::StoreUnavailable(e)
            }
            e => Self::Unexpected(e.into()),
        }
    }
}

/// Axum allows you to return `Result` from handler functions, but the error type
/// also must be some sort of response type.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Unexpected(ref e) => {
                tracing::error!("{:?}", e);
                "Unexpected error".to_owned()
            }
            Self::StoreUnavailable(ref e) => {
                tracing::error!("{:?}", e);
                self.to_string()
            }
            Self::Unauthorized(ref s) => {
                tracing::warn!(reason = %s, "rejected unauthenticated request");
                self.to_string()
            }
            _ => {
                tracing::info!("{}", self);
                self.to_string()
            }
        };

        let status = self.status_code();
        let details = match self {
            Self::Validation { field, message: detail } => Some(vec![schema::ErrorDetails {
                field: field.to_owned(),
                message: detail,
            }]),
            _ => None,
        };
        (
            status,
            Json(schema::Error {
                code: status.as_u16(),
                message,
                details,
            }),
        )
            .into_response()
    }
}
