use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

use crate::engagement::{EngagementError, is_unavailable};

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `STORAGE_UNAVAILABLE`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Event not found")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// The database could not be reached. Fails the request, not the process.
    StorageUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::StorageUnavailable(detail) => {
                tracing::error!("Storage unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "STORAGE_UNAVAILABLE",
                        message: "The data store is temporarily unavailable".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }

    /// Map a unique-constraint violation to `Conflict`, anything else as usual.
    pub fn conflict_on_unique(err: DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.into()),
            _ => AppError::from(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if is_unavailable(&err) {
            AppError::StorageUnavailable(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl From<EngagementError> for AppError {
    fn from(err: EngagementError) -> Self {
        match err {
            EngagementError::StorageUnavailable(e) => AppError::StorageUnavailable(e.to_string()),
            EngagementError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}
