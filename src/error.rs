//! Error types for the FOP Editor server
//!
//! Errors leave the API as plain text, matching what the editor frontend
//! shows to the user verbatim.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::render::RenderError;
use crate::request::ValidationError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid JSON payload")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::InvalidJson(e) => {
                tracing::debug!("Rejected render payload: {}", e);
            }
            AppError::Render(e) if e.is_cancellation() => {
                tracing::warn!("Render aborted: {}", e);
            }
            AppError::Render(e) => {
                tracing::error!("Render failed: {}", e);
            }
            _ => {}
        }

        let body = format!("{}\n", self);

        if let AppError::MethodNotAllowed = self {
            return (status, [(header::ALLOW, "POST")], body).into_response();
        }
        (status, body).into_response()
    }
}
