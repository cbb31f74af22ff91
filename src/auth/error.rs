// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Bearer authentication error type.
///
/// Raised while turning an `Authorization` header into an
/// [`AuthenticatedUser`](super::AuthenticatedUser).
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token is malformed
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Token issuer is invalid
    InvalidIssuer,
    /// Refresh token used as access token or vice versa
    WrongTokenType,
    /// Session was logged out or has expired
    SessionRevoked,
    /// Token subject no longer exists
    UnknownAccount,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::WrongTokenType => "wrong_token_type",
            AuthError::SessionRevoked => "session_revoked",
            AuthError::UnknownAccount => "unknown_account",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InvalidIssuer => write!(f, "Token issuer is invalid"),
            AuthError::WrongTokenType => write!(f, "Token type is not valid for this operation"),
            AuthError::SessionRevoked => write!(f, "Session has been logged out or expired"),
            AuthError::UnknownAccount => write!(f, "Account no longer exists"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn revoked_session_returns_401() {
        let response = AuthError::SessionRevoked.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_error_is_500() {
        let err = AuthError::InternalError("db down".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal authentication error: db down");
    }
}
