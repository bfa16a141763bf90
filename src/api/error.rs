//! Errors surfaced at the HTTP boundary

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::builder::BuildError;

/// Failures a handler can return
#[derive(Debug, Error)]
pub enum ApiError {
    /// No entry matched a single-entry lookup
    #[error("Pokemon not found.")]
    NotFound,
    /// Anything else; the message is passed through as `details`
    #[error("Internal error while processing the request.")]
    Internal(String),
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() }))).into_response()
            }
            ApiError::Internal(details) => {
                tracing::error!(details = %details, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string(), "details": details })),
                )
                    .into_response()
            }
        }
    }
}
