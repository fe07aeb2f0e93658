//! Error types for PayScope services
//!
//! Provides a single error enum for the whole service with:
//! - Distinct variants for validation, auth and resource failures
//! - HTTP status code mapping
//! - Structured error responses with machine-readable codes

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidCompensation,

    // Authentication errors (2xxx)
    Unauthorized,
    InvalidToken,
    ExpiredToken,

    // Authorization errors (3xxx)
    Forbidden,

    // Resource errors (4xxx)
    SalaryNotFound,
    CommentNotFound,

    // Rate limiting (6xxx)
    RateLimited,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Internal errors (9xxx)
    InternalError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidCompensation => 1003,

            ErrorCode::Unauthorized => 2001,
            ErrorCode::InvalidToken => 2002,
            ErrorCode::ExpiredToken => 2003,

            ErrorCode::Forbidden => 3001,

            ErrorCode::SalaryNotFound => 4002,
            ErrorCode::CommentNotFound => 4003,

            ErrorCode::RateLimited => 6001,

            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            ErrorCode::InternalError => 9001,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid total compensation: {value:?}")]
    InvalidCompensation { value: String },

    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid access token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // Resource errors
    #[error("Salary not found: {id}")]
    SalaryNotFound { id: String },

    #[error("Comment not found: {id}")]
    CommentNotFound { id: String },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidCompensation { .. } => ErrorCode::InvalidCompensation,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::ExpiredToken => ErrorCode::ExpiredToken,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::SalaryNotFound { .. } => ErrorCode::SalaryNotFound,
            AppError::CommentNotFound { .. } => ErrorCode::CommentNotFound,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidCompensation { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized { .. } | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::SalaryNotFound { .. } | AppError::CommentNotFound { .. } => {
                StatusCode::NOT_FOUND
            }

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Database(_) | AppError::Internal { .. } | AppError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 503 Service Unavailable
            AppError::DatabaseConnection { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Name of the offending input field, when known
    pub fn field(&self) -> Option<&str> {
        match self {
            AppError::Validation { field, .. } => field.as_deref(),
            AppError::MissingField { field } => Some(field),
            AppError::InvalidCompensation { .. } => Some("totalCompensation"),
            _ => None,
        }
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field: self.field().map(String::from),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|f| f.to_string());
        AppError::Validation {
            message: errors.to_string(),
            field,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            message: rejection.body_text(),
            field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::SalaryNotFound { id: "test".into() };
        assert_eq!(err.code(), ErrorCode::SalaryNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.code().as_code(), 4002);
    }

    #[test]
    fn test_missing_field_is_client_error() {
        let err = AppError::MissingField {
            field: "company".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field(), Some("company"));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_invalid_compensation_points_at_total() {
        let err = AppError::InvalidCompensation { value: "-5".into() };
        assert_eq!(err.code(), ErrorCode::InvalidCompensation);
        assert_eq!(err.field(), Some("totalCompensation"));
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "Something went wrong".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_json_rejection_becomes_validation() {
        use axum::{body::Body, extract::FromRequest, http::Request};

        let request = Request::builder()
            .header("content-type", "application/json")
            .body(Body::from("{\"content\": "))
            .unwrap();
        let rejection = Json::<serde_json::Value>::from_request(request, &())
            .await
            .unwrap_err();

        let err = AppError::from(rejection);
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
