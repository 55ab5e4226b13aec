use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Failures of the service layer, independent of the transport.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is missing, failing or too slow; nothing was applied.
    #[error("{0}")]
    StoreUnavailable(#[source] StorageError),
    /// No catalog or roster entry matches the request.
    #[error("{0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        Self::StoreUnavailable(err)
    }
}

/// Error returned by HTTP handlers, rendered as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or invalid request.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unknown award, room or guest.
    #[error("not found: {0}")]
    NotFound(String),
    /// The state store refused the write; clients should retry later.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::StoreUnavailable(source) => Self::ServiceUnavailable(source.to_string()),
            ServiceError::NotFound(message) => Self::NotFound(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        Self::BadRequest(format!("validation failed: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorMessage {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorMessage {
            message: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
