use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration source could not be read: {0}")]
    SourceError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Configuration could not be rendered: {0}")]
    RenderError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
