// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and session endpoints.

use axum::{extract::State, http::StatusCode};

use super::extract::Json;
use crate::{
    auth::{Auth, AuthProvider},
    care::AccountService,
    error::ApiError,
    models::{
        AccessTokenResponse, AccountResponse, LoginRequest, MessageResponse, RefreshRequest,
        RegisterRequest, TokenPairResponse,
    },
    state::AppState,
};

/// Register an account. Role defaults to PATIENT.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = AccountResponse),
        (status = 400, description = "Validation failed or email taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = state
        .blocking(move |db, config| {
            AccountService::new(db, config.password_cost).register_patient(&request)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Register a caregiver account. Any requested role is ignored.
#[utoipa::path(
    post,
    path = "/v1/auth/register/caregiver",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = AccountResponse),
        (status = 400, description = "Validation failed or email taken")
    )
)]
pub async fn register_caregiver(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = state
        .blocking(move |db, config| {
            AccountService::new(db, config.password_cost).register_caregiver(&request)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenPairResponse),
        (status = 400, description = "Authentication failed")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let tokens = state
        .blocking(move |db, config| {
            AuthProvider::new(db, config).login(&request.email, &request.password)
        })
        .await?;
    Ok(Json(TokenPairResponse {
        access: tokens.access,
        refresh: tokens.refresh,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AccessTokenResponse),
        (status = 401, description = "Refresh token invalid, expired or revoked")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access = state
        .blocking(move |db, config| AuthProvider::new(db, config).refresh(&request.refresh))
        .await?;
    Ok(Json(AccessTokenResponse { access }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn logout(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .blocking(move |db, config| AuthProvider::new(db, config).logout(&user))
        .await?;
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}
