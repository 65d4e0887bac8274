//! Request failures and their `{ "error": ... }` responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use todo_core::{ErrorBody, TitleError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidTitle(#[from] TitleError),

    #[error("ID is required")]
    MissingId,

    #[error("ID must be an integer")]
    InvalidId,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Todo not found")]
    NotFound,

    #[error("No todo ids left")]
    IdsExhausted,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::IdsExhausted => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidTitle(_)
            | AppError::MissingId
            | AppError::InvalidId
            | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, error = %self, "request rejected");
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
