use crate::codes;
use thiserror::Error;

/// Errors that end the process
#[derive(Error, Debug)]
pub enum PrbacError {
    /// Settings or the permission catalog could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The HTTP server stopped with an error
    #[error("Server error: {0}")]
    ServerError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PrbacError {
    /// Stable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            PrbacError::ConfigError(_) => codes::config::INVALID_SETTINGS,
            PrbacError::NetworkError(_) => codes::backend::UNAVAILABLE,
            PrbacError::ServerError(_) => codes::server::STARTUP_FAILED,
            PrbacError::InternalError(_) | PrbacError::Other(_) => codes::server::INTERNAL,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            PrbacError::ConfigError(_) => "configuration_error",
            PrbacError::NetworkError(_) => "network_error",
            PrbacError::ServerError(_) => "server_error",
            PrbacError::InternalError(_) | PrbacError::Other(_) => "internal_error",
        }
    }
}

/// Result type alias for process-level operations
pub type Result<T> = std::result::Result<T, PrbacError>;

/// Async logging function for errors
pub async fn log_error(context: &str, error: &PrbacError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error_type = error.error_type(),
        error = %error,
        "PRBAC error occurred"
    );
}
