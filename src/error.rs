// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::GuardError;
use crate::magic_link::{MagicLinkError, ValidationError};

/// Failure surfaced to HTTP clients. `Display` is the client-safe message;
/// internal detail is logged where the error is converted.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    #[error("{0}")]
    InvalidJson(String),

    #[error("{0}")]
    Unauthorized(String),
    // Rejected magic link; the body carries the numeric 460/461 code
    #[error("{0}")]
    TokenRejected(ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InternalServerError(String),

    // Customer directory unreachable
    #[error("{0}")]
    BadGateway(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::TokenRejected(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Machine-readable code for the response body
    pub fn error_code(&self) -> Value {
        let code = match self {
            ApiError::TokenRejected(reason) => return json!(reason.code()),
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
        };
        json!(code)
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "message": self.to_string(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(fields), .. } = self {
            body["field_errors"] = json!(fields);
        }

        body
    }

    /// Single-field validation failure
    pub fn field_error(field: &str, problem: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), problem.into());
        ApiError::ValidationError {
            message: "Invalid field format".to_string(),
            field_errors: Some(field_errors),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::MagicLink(reason) => ApiError::TokenRejected(reason),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<MagicLinkError> for ApiError {
    fn from(err: MagicLinkError) -> Self {
        match err {
            MagicLinkError::AccountNotFound(_) => {
                ApiError::not_found("No active account found for this email")
            }
            MagicLinkError::Directory(e) => {
                tracing::error!("Customer directory error: {}", e);
                ApiError::bad_gateway("Customer directory temporarily unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidJson(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::DirectoryError;

    #[test]
    fn test_token_rejection_carries_numeric_code() {
        let err = ApiError::from(GuardError::MagicLink(ValidationError::Expired));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_json()["code"], 461);
        assert_eq!(err.to_json()["message"], "Token expired");
    }

    #[test]
    fn test_other_guard_errors_are_unauthorized() {
        let err = ApiError::from(GuardError::MissingCredentials);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_json()["code"], "UNAUTHORIZED");
    }

    #[test]
    fn test_magic_link_errors() {
        let err = ApiError::from(MagicLinkError::AccountNotFound("a@b.com".to_string()));
        assert_eq!(err.status_code(), 404);
        // The email is not echoed back
        assert!(!err.to_string().contains("a@b.com"));

        let err = ApiError::from(MagicLinkError::Directory(DirectoryError::Unavailable("timeout".to_string())));
        assert_eq!(err.status_code(), 502);
        assert!(!err.to_string().contains("timeout"));
    }

    #[test]
    fn test_field_error_shape() {
        let json = ApiError::field_error("hours", "Must be a positive integer").to_json();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["field_errors"]["hours"], "Must be a positive integer");
    }

    #[test]
    fn test_internal_error_response() {
        let response = ApiError::internal_server_error("Failed to serialize response data").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
