// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    care::{FieldErrors, PatientSummary},
    models::{
        AccessTokenResponse, AccountResponse, CreatePreferenceRequest, CreateRelationshipRequest,
        LoginRequest, MessageResponse, RefreshRequest, RegisterRequest, TokenPairResponse,
        UpdateProfileRequest, UpdateRelationshipRequest,
    },
    state::AppState,
    storage::{
        NotificationChannel, PermissionLevel, RelationshipCategory, StoredPreference,
        StoredRelationship,
    },
};

pub mod auth;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod preferences;
pub mod relationships;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/register/caregiver", post(auth::register_caregiver))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/users/me",
            get(users::get_current_user).patch(users::update_current_user),
        )
        .route(
            "/relationships",
            get(relationships::list_relationships).post(relationships::create_relationship),
        )
        .route(
            "/relationships/{relationship_id}",
            put(relationships::update_relationship).delete(relationships::delete_relationship),
        )
        .route("/caregiver/dashboard", get(dashboard::caregiver_dashboard))
        .route(
            "/notification-preferences",
            get(preferences::list_preferences).post(preferences::create_preference),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// Registers the bearer token scheme referenced by `security(("bearer" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /v1/auth/login."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        auth::register,
        auth::register_caregiver,
        auth::login,
        auth::refresh,
        auth::logout,
        users::get_current_user,
        users::update_current_user,
        relationships::list_relationships,
        relationships::create_relationship,
        relationships::update_relationship,
        relationships::delete_relationship,
        dashboard::caregiver_dashboard,
        preferences::list_preferences,
        preferences::create_preference,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Role,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            UpdateProfileRequest,
            AccountResponse,
            TokenPairResponse,
            AccessTokenResponse,
            MessageResponse,
            RelationshipCategory,
            PermissionLevel,
            StoredRelationship,
            CreateRelationshipRequest,
            UpdateRelationshipRequest,
            PatientSummary,
            NotificationChannel,
            StoredPreference,
            CreatePreferenceRequest,
            FieldErrors,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and sessions"),
        (name = "Users", description = "Current account profile"),
        (name = "Relationships", description = "Patient-owned caregiver relationships"),
        (name = "Caregiver", description = "Caregiver dashboard"),
        (name = "Notification Preferences", description = "Per-user notification settings"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
