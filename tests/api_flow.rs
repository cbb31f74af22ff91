// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Router-level walkthrough: register, link, dashboard, revoke.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use carelink_server::{api::router, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::in_memory().expect("in-memory state"))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, path: &str, email: &str) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        path,
        None,
        Some(json!({"email": email, "password": "s3cret-pass", "name": email})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");
    body
}

async fn login(app: &Router, email: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({"email": email, "password": "s3cret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {email}: {body}");
    (
        body["access"].as_str().unwrap().to_string(),
        body["refresh"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn patient_links_caregiver_then_revokes() {
    let app = app();

    let p1 = register(&app, "/v1/auth/register", "p1@x.com").await;
    let c1 = register(&app, "/v1/auth/register/caregiver", "c1@x.com").await;
    assert_eq!(p1["role"], "PATIENT");
    assert_eq!(c1["role"], "CAREGIVER");

    let (p1_token, _) = login(&app, "p1@x.com").await;
    let (c1_token, _) = login(&app, "c1@x.com").await;

    let (status, rel) = call(
        &app,
        Method::POST,
        "/v1/relationships",
        Some(&p1_token),
        Some(json!({"caregiver_email": "c1@x.com", "permission_level": "MODIFY"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{rel}");
    assert_eq!(rel["patient_id"], p1["id"]);
    assert_eq!(rel["caregiver_id"], c1["id"]);
    assert_eq!(rel["can_modify_schedule"], true);
    let rel_id = rel["id"].as_str().unwrap().to_string();

    let (status, dashboard) = call(&app, Method::GET, "/v1/caregiver/dashboard", Some(&c1_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard.as_array().unwrap().len(), 1);
    assert_eq!(dashboard[0]["patient_id"], p1["id"]);
    assert_eq!(dashboard[0]["can_modify_schedule"], true);

    // Caregiver cannot delete; the patient can
    let path = format!("/v1/relationships/{rel_id}");
    let (status, _) = call(&app, Method::DELETE, &path, Some(&c1_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, Method::DELETE, &path, Some(&p1_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Caregiver relationship deleted successfully");

    let (status, dashboard) = call(&app, Method::GET, "/v1/caregiver/dashboard", Some(&c1_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard, json!([]));
}

#[tokio::test]
async fn role_and_ownership_rules_over_http() {
    let app = app();
    register(&app, "/v1/auth/register", "p1@x.com").await;
    register(&app, "/v1/auth/register", "p2@x.com").await;
    register(&app, "/v1/auth/register/caregiver", "c1@x.com").await;
    let (p1_token, _) = login(&app, "p1@x.com").await;
    let (p2_token, _) = login(&app, "p2@x.com").await;
    let (c1_token, _) = login(&app, "c1@x.com").await;

    // Caregiver cannot create
    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/relationships",
        Some(&c1_token),
        Some(json!({"caregiver_email": "c1@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "forbidden_role");

    // A patient's email does not resolve as a caregiver
    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/relationships",
        Some(&p1_token),
        Some(json!({"caregiver_email": "p2@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, rel) = call(
        &app,
        Method::POST,
        "/v1/relationships",
        Some(&p1_token),
        Some(json!({"caregiver_email": "c1@x.com", "relationship": "PROFESSIONAL"})),
    )
    .await;
    assert_eq!(rel["category"], "PROFESSIONAL");

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/relationships",
        Some(&p1_token),
        Some(json!({"caregiver_email": "C1@X.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "duplicate_relationship");

    // Another patient updating is Forbidden, not NotFound
    let path = format!("/v1/relationships/{}", rel["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::PUT, &path, Some(&p2_token), Some(json!({"notes": "mine"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Both parties list it; the outsider does not
    for (token, expected) in [(&p1_token, 1), (&c1_token, 1), (&p2_token, 0)] {
        let (status, listed) = call(&app, Method::GET, "/v1/relationships", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), expected);
    }

    // Patients cannot read the dashboard
    let (status, _) = call(&app, Method::GET, "/v1/caregiver/dashboard", Some(&p1_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_revokes_tokens() {
    let app = app();
    register(&app, "/v1/auth/register", "p1@x.com").await;
    let (access, refresh) = login(&app, "p1@x.com").await;

    let (status, me) = call(&app, Method::GET, "/v1/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "p1@x.com");

    let (status, _) = call(&app, Method::POST, "/v1/auth/logout", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/v1/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "session_revoked");

    let (status, _) = call(&app, Method::POST, "/v1/auth/refresh", None, Some(json!({"refresh": refresh}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_validation_and_health() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/auth/register",
        None,
        Some(json!({"email": "bad", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "validation_error");
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["password"].is_array());
    assert!(body["fields"]["name"].is_array());

    let (status, _) = call(&app, Method::GET, "/v1/relationships", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"], "ok");
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app();
    register(&app, "/v1/auth/register", "p1@x.com").await;
    register(&app, "/v1/auth/register/caregiver", "c1@x.com").await;
    let (p1_token, _) = login(&app, "p1@x.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/relationships",
        Some(&p1_token),
        Some(json!({"caregiver_email": "c1@x.com", "permission_level": "ADMIN"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error_code"], "validation_error");

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({"email": "p1@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error_code"], "validation_error");

    // Nothing was linked by the rejected request
    let (_, listed) = call(&app, Method::GET, "/v1/relationships", Some(&p1_token), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn empty_preference_body_uses_defaults() {
    let app = app();
    register(&app, "/v1/auth/register", "p1@x.com").await;
    let (token, _) = login(&app, "p1@x.com").await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/v1/notification-preferences",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["channel"], "PUSH");
    assert_eq!(created["medication_reminders"], true);
    assert_eq!(created["missed_dose_alerts"], true);
    assert_eq!(created["reminder_lead_minutes"], 15);
    assert!(created.get("enabled").is_none());

    let (status, listed) = call(
        &app,
        Method::GET,
        "/v1/notification-preferences",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
