// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::extract::State;

use super::extract::Json;
use crate::{
    auth::Auth,
    care::AccountService,
    error::ApiError,
    models::{AccountResponse, UpdateProfileRequest},
    state::AppState,
};

/// Get the current authenticated user's account.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account information", body = AccountResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .blocking(move |db, config| AccountService::new(db, config.password_cost).profile(&user))
        .await?;
    Ok(Json(account.into()))
}

/// Update the current user's display name.
///
/// Email and role cannot be changed.
#[utoipa::path(
    patch,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn update_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .blocking(move |db, config| {
            AccountService::new(db, config.password_cost).update_profile(&user, &request)
        })
        .await?;
    Ok(Json(account.into()))
}
