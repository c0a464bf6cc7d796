//! Error responses shared by every HTTP module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::handlers::FlowError;
use crate::domain::foundation::{ErrorCode, ValidationError};

/// JSON body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error that renders as [`ErrorResponse`].
#[derive(Debug)]
pub enum ApiError {
    BadRequest(ErrorResponse),
    Unavailable(ErrorResponse),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(body) => (StatusCode::BAD_REQUEST, body),
            ApiError::Unavailable(body) => (StatusCode::SERVICE_UNAVAILABLE, body),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal("An internal error occurred"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let body = ErrorResponse::new(ErrorCode::from(&err), err.to_string())
            .with_details(serde_json::json!({ "field": err.field() }));
        ApiError::BadRequest(body)
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Validation(inner) => inner.into(),
            other => {
                tracing::warn!(error = %other, "Prompt flow failed");
                ApiError::Unavailable(ErrorResponse::new(
                    other.code(),
                    "The assistant is temporarily unavailable. Please try again later.",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests_with_field() {
        let response = ApiError::from(ValidationError::empty_field("query")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn flow_failures_hide_provider_detail() {
        let err = FlowError::Provider(crate::ports::AIError::unavailable("10.0.0.7 refused"));
        match ApiError::from(err) {
            ApiError::Unavailable(body) => {
                assert_eq!(body.code, "ASSISTANT_UNAVAILABLE");
                assert!(!body.message.contains("10.0.0.7"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
