//! Configuration error types

use thiserror::Error;

use crate::domain::foundation::DocsError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Names the environment variable(s) to set.
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Base URL must be http(s): {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,
}

/// Configuration problems reach callers as `CONFIGURATION_MISSING`.
impl From<ConfigError> for DocsError {
    fn from(err: ConfigError) -> Self {
        DocsError::configuration_missing(err.to_string())
    }
}

impl From<ValidationError> for DocsError {
    fn from(err: ValidationError) -> Self {
        ConfigError::from(err).into()
    }
}
