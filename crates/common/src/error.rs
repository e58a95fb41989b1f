use thiserror::Error;

/// Errors raised while loading settings or bootstrapping shared infrastructure
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfhubError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration validation failed: {details}")]
    ConfigValidation { details: String },

    #[error("Tracing initialization failed: {0}")]
    Tracing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ConfhubError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error naming the offending setting
    pub fn validation(details: impl Into<String>) -> Self {
        Self::ConfigValidation {
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfhubError>;
