//! Error types for cdl-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{
    AggregateError, CsvDecodeError, GatewayError, ImportError, StoreReadError, ValidationFailure,
};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., duplicate phone
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rows failed validation (400), nothing was written
    #[error("Validation errors found")]
    Validation(ValidationFailure),

    /// Upstream service answered with an error status
    #[error("Upstream error ({0}): {1}")]
    Upstream(StatusCode, String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Validation(failure) => {
                let body = Json(json!({
                    "message": "Validation errors found",
                    "errors": failure.messages(),
                    "valid_rows": failure.valid_rows,
                    "total_rows": failure.total_rows,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Upstream(status, msg) => (status, "UPSTREAM_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Validation(failure) => ApiError::Validation(failure),
            ImportError::EmptyBatch => ApiError::BadRequest("No valid rows found in CSV".to_string()),
            ImportError::Aggregate(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<CsvDecodeError> for ApiError {
    fn from(err: CsvDecodeError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<StoreReadError> for ApiError {
    fn from(err: StoreReadError) -> Self {
        ApiError::Upstream(StatusCode::BAD_GATEWAY, err.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Status { status, body } => ApiError::Upstream(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                format!("Evolution API error: {}", body),
            ),
            GatewayError::Timeout(_) => ApiError::Upstream(StatusCode::GATEWAY_TIMEOUT, err.to_string()),
            GatewayError::Network(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
