// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use super::extract::Json;
use crate::{
    auth::Auth,
    care::CareEngine,
    error::ApiError,
    models::{CreateRelationshipRequest, MessageResponse, UpdateRelationshipRequest},
    state::AppState,
    storage::StoredRelationship,
};

/// Relationships in which the caller is the patient or the caregiver.
#[utoipa::path(
    get,
    path = "/v1/relationships",
    tag = "Relationships",
    security(("bearer" = [])),
    responses((status = 200, body = [StoredRelationship]))
)]
pub async fn list_relationships(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredRelationship>>, ApiError> {
    let relationships = state
        .blocking(move |db, _| CareEngine::new(db).list_relationships(&user))
        .await?;
    Ok(Json(relationships))
}

/// Link the calling patient to a caregiver by email.
#[utoipa::path(
    post,
    path = "/v1/relationships",
    request_body = CreateRelationshipRequest,
    tag = "Relationships",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredRelationship),
        (status = 400, description = "Duplicate relationship or invalid input"),
        (status = 403, description = "Caller is not a patient"),
        (status = 404, description = "No caregiver with that email")
    )
)]
pub async fn create_relationship(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateRelationshipRequest>,
) -> Result<(StatusCode, Json<StoredRelationship>), ApiError> {
    let relationship = state
        .blocking(move |db, _| CareEngine::new(db).create_relationship(&user, &request))
        .await?;
    Ok((StatusCode::CREATED, Json(relationship)))
}

/// Partially update a relationship the caller owns.
#[utoipa::path(
    put,
    path = "/v1/relationships/{relationship_id}",
    params(
        ("relationship_id" = String, Path, description = "Identifier of the relationship to update")
    ),
    request_body = UpdateRelationshipRequest,
    tag = "Relationships",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoredRelationship),
        (status = 403, description = "Caller does not own the relationship"),
        (status = 404, description = "Relationship not found")
    )
)]
pub async fn update_relationship(
    Auth(user): Auth,
    Path(relationship_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateRelationshipRequest>,
) -> Result<Json<StoredRelationship>, ApiError> {
    let relationship = state
        .blocking(move |db, _| {
            CareEngine::new(db).update_relationship(&user, &relationship_id, request)
        })
        .await?;
    Ok(Json(relationship))
}

#[utoipa::path(
    delete,
    path = "/v1/relationships/{relationship_id}",
    params(
        ("relationship_id" = String, Path, description = "Identifier of the relationship to delete")
    ),
    tag = "Relationships",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Relationship deleted", body = MessageResponse),
        (status = 404, description = "No relationship with that id owned by the caller")
    )
)]
pub async fn delete_relationship(
    Auth(user): Auth,
    Path(relationship_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .blocking(move |db, _| CareEngine::new(db).delete_relationship(&user, &relationship_id))
        .await?;
    Ok(Json(MessageResponse {
        message: "Caregiver relationship deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::storage::{AccountRepository, PermissionLevel, StoredAccount};

    fn seed(state: &AppState, email: &str, role: Role) -> AuthenticatedUser {
        let account = StoredAccount::new(email, "Someone", role, "hash".into());
        AccountRepository::new(&state.db).create(&account).unwrap();
        AuthenticatedUser {
            user_id: account.id,
            email: account.email,
            role: account.role,
            session_id: "sess".into(),
            expires_at: 0,
        }
    }

    fn link(email: &str) -> CreateRelationshipRequest {
        CreateRelationshipRequest {
            caregiver_email: email.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_relationship_success() {
        let state = AppState::in_memory().unwrap();
        let p1 = seed(&state, "p1@x.com", Role::Patient);
        let c1 = seed(&state, "c1@x.com", Role::Caregiver);

        let (status, Json(rel)) =
            create_relationship(Auth(p1.clone()), State(state.clone()), Json(link("c1@x.com")))
                .await
                .expect("relationship creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(rel.patient_id, p1.user_id);
        assert_eq!(rel.caregiver_id, c1.user_id);

        let Json(listed) = list_relationships(Auth(c1), State(state)).await.unwrap();
        assert_eq!(listed, vec![rel]);
    }

    #[tokio::test]
    async fn duplicate_is_400_and_caregiver_create_is_403() {
        let state = AppState::in_memory().unwrap();
        let p1 = seed(&state, "p1@x.com", Role::Patient);
        let c1 = seed(&state, "c1@x.com", Role::Caregiver);

        create_relationship(Auth(p1.clone()), State(state.clone()), Json(link("c1@x.com")))
            .await
            .unwrap();
        let err = create_relationship(Auth(p1), State(state.clone()), Json(link("c1@x.com")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code, Some("duplicate_relationship"));

        let err = create_relationship(Auth(c1), State(state), Json(link("c1@x.com")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn update_and_delete_statuses() {
        let state = AppState::in_memory().unwrap();
        let p1 = seed(&state, "p1@x.com", Role::Patient);
        let c1 = seed(&state, "c1@x.com", Role::Caregiver);
        let (_, Json(rel)) =
            create_relationship(Auth(p1.clone()), State(state.clone()), Json(link("c1@x.com")))
                .await
                .unwrap();

        let err = update_relationship(
            Auth(c1.clone()),
            Path(rel.id.clone()),
            State(state.clone()),
            Json(UpdateRelationshipRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let Json(updated) = update_relationship(
            Auth(p1.clone()),
            Path(rel.id.clone()),
            State(state.clone()),
            Json(UpdateRelationshipRequest {
                permission_level: Some(PermissionLevel::Modify),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.permission_level, PermissionLevel::Modify);

        let err = delete_relationship(Auth(c1), Path(rel.id.clone()), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let Json(confirmation) = delete_relationship(Auth(p1), Path(rel.id), State(state))
            .await
            .unwrap();
        assert_eq!(
            confirmation.message,
            "Caregiver relationship deleted successfully"
        );
    }
}
