// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode};

use super::extract::Json;
use crate::{
    auth::Auth,
    care::CareEngine,
    error::ApiError,
    models::CreatePreferenceRequest,
    state::AppState,
    storage::StoredPreference,
};

#[utoipa::path(
    get,
    path = "/v1/notification-preferences",
    tag = "Notification Preferences",
    security(("bearer" = [])),
    responses((status = 200, body = [StoredPreference]))
)]
pub async fn list_preferences(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredPreference>>, ApiError> {
    let preferences = state
        .blocking(move |db, _| CareEngine::new(db).list_preferences(&user))
        .await?;
    Ok(Json(preferences))
}

#[utoipa::path(
    post,
    path = "/v1/notification-preferences",
    request_body = CreatePreferenceRequest,
    tag = "Notification Preferences",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredPreference),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_preference(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreatePreferenceRequest>,
) -> Result<(StatusCode, Json<StoredPreference>), ApiError> {
    let preference = state
        .blocking(move |db, _| CareEngine::new(db).create_preference(&user, &request))
        .await?;
    Ok((StatusCode::CREATED, Json(preference)))
}
