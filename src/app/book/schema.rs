use serde::{Deserialize, Serialize};

use crate::app::error::AppError;
use crate::domain::book::author::Author;
use crate::domain::book::title::Title;
use crate::domain::book::NewBook;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Deserialize, Serialize)]
pub struct BookRequestBody {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).into()
    }

    /// Page size, capped at `MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE).into()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl TryFrom<BookRequestBody> for NewBook {
    type Error = AppError;
    fn try_from(value: BookRequestBody) -> Result<Self, Self::Error> {
        let title = Title::try_from(value.title).map_err(|message| AppError::Validation {
            field: "title",
            message,
        })?;
        let author = Author::try_from(value.author).map_err(|message| AppError::Validation {
            field: "author",
            message,
        })?;
        Ok(Self {
            title,
            author,
            description: value.description,
        })
    }
}
