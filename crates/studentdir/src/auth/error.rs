//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authentication errors surfaced to HTTP callers.
///
/// Token-level failure detail (malformed, bad signature, expired,
/// revoked) is deliberately absent: all of those collapse to an
/// unauthenticated request before a handler ever runs.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No authenticated principal on a protected route.
    #[error("missing authorization header")]
    MissingAuthHeader,

    /// Invalid credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Insufficient permissions.
    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(String),

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            AuthError::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "missing_auth_header"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AuthError::InsufficientPermissions(_) => {
                (StatusCode::FORBIDDEN, "insufficient_permissions")
            }
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(AuthErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}
