// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::provider::AuthProvider;
use super::{AuthenticatedUser, AuthError};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Validates the access token from the `Authorization: Bearer` header,
/// requires its session to still be open, and loads the account so the role
/// comes from the store rather than the token.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_relationships(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<StoredRelationship>>, ApiError> {
///     // user.user_id is the acting account
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.to_string();

        let db = Arc::clone(&state.db);
        let auth_config = Arc::clone(&state.auth_config);
        let user = tokio::task::spawn_blocking(move || {
            AuthProvider::new(&db, &auth_config).authenticate(&token)
        })
        .await
        .map_err(|e| AuthError::InternalError(e.to_string()))??;

        Ok(Auth(user))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}
