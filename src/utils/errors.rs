//! Error handling for MP Tourify
//!
//! This module defines the main error types used throughout the application
//! and how they are rendered as HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Main error type for the MP Tourify backend
#[derive(Error, Debug)]
pub enum TourifyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Object storage specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
}

/// Result type alias for MP Tourify operations
pub type Result<T> = std::result::Result<T, TourifyError>;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl TourifyError {
    /// Shorthand for a missing row
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        TourifyError::NotFound { entity, id: id.to_string() }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TourifyError::Database(_) => false,
            TourifyError::Migration(_) => false,
            TourifyError::Storage(_) => true,
            TourifyError::Config(_) => false,
            TourifyError::PermissionDenied(_) => false,
            TourifyError::NotFound { .. } => false,
            TourifyError::Conflict(_) => false,
            TourifyError::Http(_) => true,
            TourifyError::Jwt(_) => false,
            TourifyError::Password(_) => false,
            TourifyError::Serialization(_) => false,
            TourifyError::Io(_) => true,
            TourifyError::Authentication(_) => false,
            TourifyError::RateLimitExceeded => true,
            TourifyError::InvalidInput(_) => false,
            TourifyError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TourifyError::Database(_) => ErrorSeverity::Critical,
            TourifyError::Migration(_) => ErrorSeverity::Critical,
            TourifyError::Config(_) => ErrorSeverity::Critical,
            TourifyError::PermissionDenied(_) => ErrorSeverity::Warning,
            TourifyError::Authentication(_) => ErrorSeverity::Warning,
            TourifyError::Jwt(_) => ErrorSeverity::Warning,
            TourifyError::RateLimitExceeded => ErrorSeverity::Warning,
            TourifyError::InvalidInput(_) => ErrorSeverity::Info,
            TourifyError::NotFound { .. } => ErrorSeverity::Info,
            TourifyError::Conflict(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            TourifyError::Authentication(_) | TourifyError::Jwt(_) => StatusCode::UNAUTHORIZED,
            TourifyError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            TourifyError::NotFound { .. } => StatusCode::NOT_FOUND,
            TourifyError::Conflict(_) => StatusCode::CONFLICT,
            TourifyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TourifyError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            TourifyError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            TourifyError::Storage(StorageError::UnsupportedFileType(_)) => StatusCode::BAD_REQUEST,
            TourifyError::Storage(_) | TourifyError::Http(_) => StatusCode::BAD_GATEWAY,
            TourifyError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                StatusCode::CONFLICT
            }
            TourifyError::Database(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to API clients. Internal failures are not echoed back.
    fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::CONFLICT if matches!(self, TourifyError::Database(_)) => {
                "A record with the same unique value already exists".to_string()
            }
            StatusCode::BAD_REQUEST if matches!(self, TourifyError::Database(_)) => {
                "Referenced record does not exist".to_string()
            }
            StatusCode::UNAUTHORIZED if matches!(self, TourifyError::Jwt(_)) => {
                "Invalid or expired session".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for TourifyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, severity = %self.severity(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
