use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::codes;
use prbac_zanzibar::ZanzibarError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type
    pub error_type: String,
    /// Stable error code
    pub error_code: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Suggested actions for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Response metadata for lists
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Operation not implemented: {operation}")]
    NotImplemented { operation: String },

    #[error("Relationship backend error: {message}")]
    Backend { message: String, code: &'static str },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Invalid identifier: {message}")]
    InvalidIdentifier { message: String },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an error for a required field that was absent or blank
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create a not implemented error naming the operation
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::MissingField { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            ApiError::Backend { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::MissingField { .. } => "validation_error",
            ApiError::NotImplemented { .. } => "not_implemented",
            ApiError::Backend { .. } => "backend_error",
            ApiError::Internal { .. } => "internal_error",
            ApiError::InvalidIdentifier { .. } => "validation_error",
        }
    }

    /// Stable code carried in the response body
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::INVALID_INPUT,
            ApiError::MissingField { .. } => codes::validation::MISSING_REQUIRED_FIELD,
            ApiError::NotImplemented { .. } => codes::server::NOT_IMPLEMENTED,
            ApiError::Backend { code, .. } => *code,
            ApiError::Internal { .. } => codes::server::INTERNAL,
            ApiError::InvalidIdentifier { .. } => codes::validation::INVALID_IDENTIFIER,
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Validation { .. }
            | ApiError::MissingField { .. }
            | ApiError::InvalidIdentifier { .. } => Some(vec![
                "Check the request payload and query parameters".to_string(),
                "Ensure identifiers are UUIDs and names are not blank".to_string(),
            ]),
            ApiError::Backend { .. } => Some(vec![
                "Try again in a few moments".to_string(),
                "Check that the relationship backend is reachable".to_string(),
            ]),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            error_code = %self.error_code(),
            status_code = %status_code.as_u16(),
            error = %self,
            "API error occurred"
        );

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            error_code: self.error_code().to_string(),
            message: self.to_string(),
            timestamp: chrono::Utc::now(),
            suggestions: self.suggestions(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<ZanzibarError> for ApiError {
    fn from(error: ZanzibarError) -> Self {
        match error {
            ZanzibarError::ValidationError(message) => ApiError::Validation { message },
            ZanzibarError::InvalidIdentifier(message) => ApiError::InvalidIdentifier { message },
            ZanzibarError::Backend(message) => ApiError::Backend {
                message,
                code: codes::backend::REQUEST_FAILED,
            },
            ZanzibarError::Transport(message) => ApiError::Backend {
                message,
                code: codes::backend::UNAVAILABLE,
            },
            ZanzibarError::Serialization(err) => ApiError::Backend {
                message: err.to_string(),
                code: codes::backend::MALFORMED_RESPONSE,
            },
            ZanzibarError::InvalidCatalog(message) => ApiError::Internal { message },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation {
            message: format!("Invalid JSON body: {}", rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation {
            message: format!("Invalid query parameters: {}", rejection.body_text()),
        }
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Successful list response carrying its length as `total_count`
pub fn api_list<T>(data: Vec<T>) -> ApiResponse<Vec<T>> {
    let total_count = data.len();
    ApiResponse {
        success: true,
        data,
        metadata: Some(ResponseMetadata {
            total_count: Some(total_count),
        }),
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
