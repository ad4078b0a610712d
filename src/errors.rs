//! Error types for the portal's HTTP surface.
//!
//! Redirect denials are not errors: they are verdict data, handled entirely
//! inside the engine/controller boundary. The variants here cover the
//! administrative surface and internal failures, with sanitized client
//! responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String, reason: String },

    #[error("Internal server error")]
    InternalError { error_id: Uuid, context: String },
}

/// Sanitized error body returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<Uuid>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, user_message) = match &self {
            AuthError::Forbidden { reason } => {
                tracing::warn!(reason = %reason, "Forbidden request");
                (StatusCode::FORBIDDEN, "access_denied", "Access denied")
            }
            AuthError::ConfigurationError { field, reason } => {
                let error_id = Uuid::new_v4();
                tracing::error!(
                    error_id = %error_id,
                    field = %field,
                    reason = %reason,
                    "Configuration error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred",
                )
            }
            AuthError::InternalError { error_id, context } => {
                tracing::error!(
                    error_id = %error_id,
                    context = %context,
                    "Internal server error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred",
                )
            }
        };

        let mut error_response = ErrorResponse {
            error: error_code.to_string(),
            error_description: user_message.to_string(),
            error_id: None,
        };

        // Only internal errors expose their id, for log correlation.
        if let AuthError::InternalError { error_id, .. } = &self {
            error_response.error_id = Some(*error_id);
        }

        (status, Json(error_response)).into_response()
    }
}

/// Create an internal error with proper context.
pub fn internal_error(context: &str) -> AuthError {
    let error_id = Uuid::new_v4();
    tracing::error!(error_id = %error_id, context = %context, "Internal error created");
    AuthError::InternalError {
        error_id,
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_403() {
        let response = AuthError::Forbidden {
            reason: "two-factor session required".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn configuration_errors_are_sanitized_500s() {
        let response = AuthError::ConfigurationError {
            field: "redirect.protected_domains".to_string(),
            reason: "empty".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_errors_carry_an_id() {
        let error = internal_error("policy swap failed");
        match &error {
            AuthError::InternalError { context, .. } => {
                assert_eq!(context, "policy swap failed");
            }
            other => panic!("unexpected variant {other:?}"),
        }
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
