//! Error handling for the order management platform
//!
//! Client mistakes, seed-data defects and store outages map to distinct responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{OrderViolation, ViolationDetail};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Status '{0}' does not exist")]
    InvalidStatus(String),

    #[error("Order rejected with {} violation(s)", .0.len())]
    InvalidOrder(Vec<OrderViolation>),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Transition from '{from}' to '{to}' is not allowed")]
    InvalidStateTransition { from: String, to: String },

    // Deployment errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the underlying store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            )
        )
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationDetail>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            violations: Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InvalidStatus(name) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some("status".to_string()),
                    ..ErrorDetail::new("INVALID_STATUS", format!("Status '{}' does not exist.", name))
                },
            ),
            AppError::InvalidOrder(violations) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    violations: violations.iter().map(OrderViolation::detail).collect(),
                    ..ErrorDetail::new("VALIDATION_ERROR", "The order draft is invalid")
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::InvalidStateTransition { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INVALID_STATE_TRANSITION", self.to_string()),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("CONFIGURATION_ERROR", format!("Configuration error: {}", msg)),
            ),
            AppError::DatabaseError(_) if self.is_unavailable() => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new("STORE_UNAVAILABLE", "The order store is temporarily unavailable"),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        match &self {
            AppError::Configuration(_) => {
                tracing::error!(alert = "seed_data", "Operational alert: {}", self)
            }
            _ if status.is_server_error() => tracing::error!("Error: {:?}", self),
            _ => tracing::warn!("Request rejected: {}", self),
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
