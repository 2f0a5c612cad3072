// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,

    #[error("Upload exceeds the limit of {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error")]
    InternalError,

    #[error("External API error: {0}")]
    ExternalApiError(String),
}

impl PhotoError {
    fn code(&self) -> &'static str {
        match self {
            PhotoError::NotFound(_) => "NOT_FOUND",
            PhotoError::AlreadyExists(_) => "ALREADY_EXISTS",
            PhotoError::DatabaseError(_) => "DATABASE_ERROR",
            PhotoError::InvalidInput(_) => "INVALID_INPUT",
            PhotoError::ValidationError(_) => "VALIDATION_ERROR",
            PhotoError::Unauthorized => "UNAUTHORIZED",
            PhotoError::Forbidden => "FORBIDDEN",
            PhotoError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            PhotoError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            PhotoError::StorageError(_) => "STORAGE_ERROR",
            PhotoError::InternalError => "INTERNAL_ERROR",
            PhotoError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
        }
    }
}

/// Convert PhotoError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PhotoError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PhotoError::NotFound(_) => StatusCode::NOT_FOUND,
            PhotoError::AlreadyExists(_) => StatusCode::CONFLICT,
            PhotoError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PhotoError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PhotoError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PhotoError::Unauthorized => StatusCode::UNAUTHORIZED,
            PhotoError::Forbidden => StatusCode::FORBIDDEN,
            PhotoError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            PhotoError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PhotoError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PhotoError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            PhotoError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PhotoError::PayloadTooLarge(10).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            PhotoError::UnsupportedMediaType("text/plain".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(PhotoError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            PhotoError::ExternalApiError("quota".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = PhotoError::NotFound("photo 42".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "NOT_FOUND");
        assert_eq!(value["error"]["message"], "Not found: photo 42");
        assert!(value["error"]["timestamp"].is_string());
    }
}
