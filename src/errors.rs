use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standardized error body returned by every handler.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable description naming the violated rule
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Unified error type for the service layer.
///
/// Precondition and authorization failures name the violated rule in their
/// message; persistence failures surface as retryable errors after the
/// enclosing transaction has rolled back in full.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(Uuid),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Helper for converting database errors with context logging at call
    /// sites that do not want `?` conversion.
    pub fn db_error(err: sea_orm::error::DbErr) -> Self {
        ServiceError::DatabaseError(err)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidOperation(_) | ServiceError::InvalidStatus(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::InsufficientStock(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::ConcurrentModification(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::EventError(_)
            | ServiceError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to API clients. Persistence failures are collapsed to
    /// a generic retryable message; the detail stays in the server log.
    pub fn response_message(&self) -> String {
        match self {
            ServiceError::DatabaseError(_) => {
                "A storage error occurred; the operation was rolled back and may be retried"
                    .to_string()
            }
            ServiceError::ConcurrentModification(id) => format!(
                "Record {} was modified concurrently; retry the operation",
                id
            ),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failures_map_to_client_errors() {
        assert_eq!(
            ServiceError::ValidationError("notes required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InsufficientStock("source short".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Forbidden("manager role required".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn database_errors_are_masked_and_retryable() {
        let err = ServiceError::DatabaseError(sea_orm::error::DbErr::Custom("boom".into()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.response_message().contains("boom"));
    }
}
