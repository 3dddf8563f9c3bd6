use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// `fail` for client errors (4xx), `error` for server errors (5xx).
    #[schema(example = "fail")]
    pub status: &'static str,
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `TAG_NOT_FOUND`, `ROUTE_NOT_FOUND`, `PAYLOAD_TOO_LARGE`, `RATE_LIMITED`,
    /// `UPLOAD_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Missing required field 'name'")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    /// Tag names a filter asked for that do not exist.
    TagNotFound(Vec<String>),
    /// Path of a request no route matched.
    RouteNotFound(String),
    PayloadTooLarge(String),
    /// Rate limit exceeded. Contains seconds until retry is allowed.
    RateLimited {
        retry_after: u64,
    },
    /// The object store refused or failed a write or delete.
    Upload(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::TagNotFound(missing) => (
                StatusCode::NOT_FOUND,
                "TAG_NOT_FOUND",
                format!("One or more tags not found: {}", missing.join(", ")),
            ),
            AppError::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                "ROUTE_NOT_FOUND",
                format!("Can't find {path} on this server!"),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests from this IP, please try again later".into(),
            ),
            AppError::Upload(detail) => {
                tracing::error!("Object store error: {}", detail);
                (StatusCode::BAD_GATEWAY, "UPLOAD_ERROR", detail)
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                )
            }
        };

        let body = ErrorBody {
            status: if status.is_server_error() { "error" } else { "fail" },
            code,
            message,
        };
        (status, body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry_after = if let AppError::RateLimited { retry_after } = &self {
            Some(*retry_after)
        } else {
            None
        };

        let (status, body) = self.status_and_body();

        if let Some(seconds) = retry_after {
            (status, [("Retry-After", seconds.to_string())], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(_) | StorageError::Config(_) => {
                AppError::Internal(err.to_string())
            }
            other => AppError::Upload(other.to_string()),
        }
    }
}
