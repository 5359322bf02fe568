//! API error handling
//!
//! Maps [`CollectionError`] onto HTTP status codes and the
//! `{"message": ..., "errors": [...]}` response body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::error::CollectionError;
use crate::schema::ValidationIssue;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationIssue>,
}

/// An error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                message: message.into(),
                errors: Vec::new(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CollectionError> for ApiError {
    fn from(error: CollectionError) -> Self {
        let status = match &error {
            CollectionError::InvalidName(_)
            | CollectionError::AlreadyExists(_)
            | CollectionError::Schema(_)
            | CollectionError::CollectionNotFound(_)
            | CollectionError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            CollectionError::ItemNotFound { .. } | CollectionError::IndexOutOfRange(_) => {
                StatusCode::NOT_FOUND
            }
            CollectionError::Auth(_) => StatusCode::UNAUTHORIZED,
            CollectionError::Io(_) | CollectionError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &error {
            CollectionError::InvalidName(name) | CollectionError::AlreadyExists(name) => format!(
                "Collection '{}' not allowed. Either the name is invalid or the collection exists already.",
                name
            ),
            CollectionError::ValidationFailed(_) => {
                "Invalid object sent. See \"errors\" for details.".to_string()
            }
            other => other.to_string(),
        };

        let errors = match error {
            CollectionError::ValidationFailed(issues) => issues,
            _ => Vec::new(),
        };

        Self {
            status,
            body: ErrorResponse { message, errors },
        }
    }
}

/// Unreadable or mistyped request bodies are the caller's fault
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
