use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZanzibarError {
    /// The relationship backend answered with an error status or an error
    /// message inside a stream.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend could not be reached or the connection broke mid-call.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An object id that does not parse as a UUID.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ZanzibarError {
    fn from(err: reqwest::Error) -> Self {
        ZanzibarError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ZanzibarError>;
