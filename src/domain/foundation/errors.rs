//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes, one per error kind surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigurationMissing,
    AuthenticationFailed,
    NotFound,
    StructuralIntegrity,
    RateLimited,
    TransportError,
    ValidationFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ConfigurationMissing => "CONFIGURATION_MISSING",
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::StructuralIntegrity => "STRUCTURAL_INTEGRITY",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::TransportError => "TRANSPORT_ERROR",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
        };
        write!(f, "{}", s)
    }
}

/// Errors surfaced by document actions.
///
/// Every failure that reaches the dispatch boundary is one of these kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocsError {
    /// A required credential or token is absent.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The remote service rejected the credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Folder, document or block could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    /// Cyclic, dangling or otherwise inconsistent block references.
    #[error("structural integrity error: {0}")]
    StructuralIntegrity(String),

    /// The remote service throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network failure, timeout or unusable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed caller input.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl DocsError {
    pub fn configuration_missing(message: impl Into<String>) -> Self {
        DocsError::ConfigurationMissing(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DocsError::NotFound(message.into())
    }

    pub fn structural(message: impl Into<String>) -> Self {
        DocsError::StructuralIntegrity(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        DocsError::Transport(message.into())
    }

    /// Returns the error code for this kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            DocsError::ConfigurationMissing(_) => ErrorCode::ConfigurationMissing,
            DocsError::AuthenticationFailed(_) => ErrorCode::AuthenticationFailed,
            DocsError::NotFound(_) => ErrorCode::NotFound,
            DocsError::StructuralIntegrity(_) => ErrorCode::StructuralIntegrity,
            DocsError::RateLimited(_) => ErrorCode::RateLimited,
            DocsError::Transport(_) => ErrorCode::TransportError,
            DocsError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    /// Human-readable message prefixed with the error code.
    pub fn envelope_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("title");
        assert_eq!(format!("{}", err), "Field 'title' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("page_size", 1, 200, -5);
        assert_eq!(
            format!("{}", err),
            "Field 'page_size' must be between 1 and 200, got -5"
        );
    }

    #[test]
    fn docs_error_maps_to_code() {
        assert_eq!(DocsError::not_found("doc").code(), ErrorCode::NotFound);
        assert_eq!(
            DocsError::structural("cycle").code(),
            ErrorCode::StructuralIntegrity
        );
        assert_eq!(
            DocsError::from(ValidationError::empty_field("title")).code(),
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn envelope_message_includes_code_and_detail() {
        let err = DocsError::not_found("document doxcn1");
        assert_eq!(err.envelope_message(), "[NOT_FOUND] not found: document doxcn1");
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::TransportError), "TRANSPORT_ERROR");
        assert_eq!(
            format!("{}", ErrorCode::ConfigurationMissing),
            "CONFIGURATION_MISSING"
        );
    }
}
