// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON body extractor whose rejections use the API error body.

use axum::{
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// Drop-in for `axum::Json`: a malformed body is a 400 `validation_error`
/// instead of axum's plain-text 422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
