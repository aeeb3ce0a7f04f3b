use crate::app::error::AppError;
use crate::domain::user::password::Password;
use crate::domain::user::username::Username;
use crate::domain::user::NewUser;

#[derive(serde::Deserialize, serde::Serialize)]
pub struct CreateUserRequestBody {
    pub username: String,
    pub password: String,
}

#[derive(serde::Deserialize, serde::Serialize)]
pub struct CreateUserResponseBody {
    pub id: i64,
    pub username: String,
}

#[derive(serde::Deserialize, serde::Serialize)]
pub struct LoginUserRequestBody {
    pub username: String,
    pub password: String,
}

#[derive(serde::Deserialize, serde::Serialize)]
pub struct LoginUserResponseBody {
    pub token: String,
}

impl TryFrom<CreateUserRequestBody> for NewUser {
    type Error = AppError;
    fn try_from(value: CreateUserRequestBody) -> Result<Self, Self::Error> {
        let username = Username::try_from(value.username).map_err(|message| {
            AppError::Validation {
                field: "username",
                message,
            }
        })?;
        let password = Password::try_from(value.password).map_err(|message| {
            AppError::Validation {
                field: "password",
                message,
            }
        })?;
        Ok(Self { username, password })
    }
}
