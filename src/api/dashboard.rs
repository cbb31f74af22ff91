// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    care::{CareEngine, PatientSummary},
    error::ApiError,
    state::AppState,
};

/// Patients linked to the calling caregiver.
#[utoipa::path(
    get,
    path = "/v1/caregiver/dashboard",
    tag = "Caregiver",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [PatientSummary]),
        (status = 403, description = "Caller is not a caregiver")
    )
)]
pub async fn caregiver_dashboard(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let summaries = state
        .blocking(move |db, _| CareEngine::new(db).caregiver_dashboard(&user))
        .await?;
    Ok(Json(summaries))
}
