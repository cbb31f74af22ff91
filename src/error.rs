// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::care::{CareError, FieldErrors};
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: Option<&'static str>,
    pub fields: Option<FieldErrors>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_code: None,
            fields: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.error_code = Some(code);
        self
    }
}

impl From<CareError> for ApiError {
    fn from(err: CareError) -> Self {
        let code = err.error_code();
        let api = match err {
            CareError::ValidationError(fields) => {
                let mut api = ApiError::bad_request(format!("Validation failed: {fields}"));
                api.fields = Some(fields);
                api
            }
            CareError::AuthenticationFailed(detail) => ApiError::bad_request(detail),
            CareError::DuplicateRelationship => ApiError::bad_request(err.to_string()),
            CareError::Unexpected(message) => ApiError::bad_request(message),
            CareError::ForbiddenRole | CareError::Forbidden => ApiError::forbidden(err.to_string()),
            CareError::CaregiverNotFound | CareError::NotFound => {
                ApiError::not_found(err.to_string())
            }
            CareError::Storage(store) => return store.into(),
        };
        api.with_code(code)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::not_found("not found").with_code("not_found"),
            StoreError::PermissionDenied { .. } => {
                ApiError::forbidden(err.to_string()).with_code("forbidden")
            }
            other => {
                tracing::error!(error = %other, "Storage failure");
                ApiError::internal("Internal storage error").with_code("storage_error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(err.status_code(), err.to_string()).with_code(err.error_code())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text()).with_code("validation_error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.error_code,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}
