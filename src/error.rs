use axum::response::Html;
use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::models::forms::FieldError;

/// Everything a handler can fail with. The first five variants are the
/// user-facing taxonomy; handlers usually recover them into a flash message
/// plus a redirect, so the status mapping below is the fallback surface
/// (and the only surface for `Forbidden`, which is rejected outright).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid input")]
    Validation(Vec<FieldError>),

    #[error("{0} is already taken")]
    Conflict(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid credentials")]
    Unauthorized,

    #[error("login required")]
    Forbidden,

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Template(_) | AppError::Session(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return (status, Html(format!("Something went wrong: {self}"))).into_response();
        }

        (status, Html(self.to_string())).into_response()
    }
}
