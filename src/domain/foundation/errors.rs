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

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Machine-readable error codes surfaced at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    UnknownPersona,

    AssistantUnavailable,
    AssistantTimeout,
    AssistantExhausted,
    UnusableResponse,

    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::UnknownPersona => "UNKNOWN_PERSONA",
            ErrorCode::AssistantUnavailable => "ASSISTANT_UNAVAILABLE",
            ErrorCode::AssistantTimeout => "ASSISTANT_TIMEOUT",
            ErrorCode::AssistantExhausted => "ASSISTANT_EXHAUSTED",
            ErrorCode::UnusableResponse => "UNUSABLE_RESPONSE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

impl From<&ValidationError> for ErrorCode {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            ValidationError::OutOfRange { .. } => ErrorCode::ValidationFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_displays_field_name() {
        let err = ValidationError::empty_field("query");
        assert_eq!(err.to_string(), "Field 'query' cannot be empty");
        assert_eq!(err.field(), "query");
    }

    #[test]
    fn invalid_format_carries_reason() {
        let err = ValidationError::invalid_format("date", "expected YYYY-MM-DD");
        assert!(err.to_string().contains("expected YYYY-MM-DD"));
    }

    #[test]
    fn error_code_maps_from_validation_error() {
        assert_eq!(
            ErrorCode::from(&ValidationError::empty_field("x")),
            ErrorCode::EmptyField
        );
        assert_eq!(ErrorCode::AssistantTimeout.to_string(), "ASSISTANT_TIMEOUT");
    }
}
