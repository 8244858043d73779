// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog and bulk admin route tests against the seeded in-memory backend.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use youth_council::models::{
    DataSnapshot, ExportBundle, HealthResponse, Offer, Profile, Stats, EXPORT_VERSION,
};

mod common;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

#[tokio::test]
async fn test_seeded_catalog() {
    let (app, _) = common::create_test_app().await;

    let response = send(&app, "GET", "/api/discounts", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let offers: Vec<Offer> = common::json_body(response).await;
    assert_eq!(offers.len(), 2);

    let response = send(&app, "GET", "/api/profiles", None, None).await;
    let profiles: Vec<Profile> = common::json_body(response).await;
    assert!(profiles
        .iter()
        .any(|p| p.telegram.as_deref() == Some("alex_ivanov")));
}

#[tokio::test]
async fn test_offer_crud_flow() {
    let (app, state) = common::create_test_app().await;
    let token = common::admin_token(&state);

    let response = send(
        &app,
        "POST",
        "/api/discounts",
        Some(&token),
        Some(json!({"title": "Coffee 15%", "category": "food", "isActive": true})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Offer = common::json_body(response).await;
    assert!(!created.id.is_empty());
    assert_eq!(created.created_at, created.updated_at);

    let response = send(&app, "GET", &format!("/api/discounts/{}", created.id), None, None).await;
    let fetched: Offer = common::json_body(response).await;
    assert_eq!(fetched, created);

    let response = send(
        &app,
        "PUT",
        &format!("/api/discounts/{}", created.id),
        Some(&token),
        Some(json!({"isActive": false, "description": "Weekdays only"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Offer = common::json_body(response).await;
    assert!(!updated.is_active);
    assert_eq!(updated.description, "Weekdays only");
    assert_eq!(updated.title, "Coffee 15%");
    assert!(updated.updated_at >= created.updated_at);

    let response = send(&app, "GET", "/api/discounts/active", None, None).await;
    let active: Vec<Offer> = common::json_body(response).await;
    assert!(active.iter().all(|o| o.is_active));
    assert!(!active.iter().any(|o| o.id == created.id));

    let response = send(
        &app,
        "DELETE",
        &format!("/api/discounts/{}", created.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", &format!("/api/discounts/{}", created.id), None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        "DELETE",
        &format!("/api/discounts/{}", created.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_patch_null_clears_field() {
    let (app, state) = common::create_test_app().await;
    let token = common::admin_token(&state);
    let profiles: Vec<Profile> = state.db.list().await;
    let target = profiles
        .iter()
        .find(|p| p.phone.is_some())
        .expect("seeded profile with a phone");

    let response = send(
        &app,
        "PUT",
        &format!("/api/profiles/{}", target.id),
        Some(&token),
        Some(json!({"phone": null})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Profile = common::json_body(response).await;
    assert_eq!(updated.phone, None);
    assert_eq!(updated.telegram, target.telegram);
}

#[tokio::test]
async fn test_stats_and_health_counts() {
    let (app, state) = common::create_test_app().await;
    let token = common::admin_token(&state);
    let offers: Vec<Offer> = state.db.list().await;

    send(
        &app,
        "PUT",
        &format!("/api/discounts/{}", offers[0].id),
        Some(&token),
        Some(json!({"isActive": false})),
    )
    .await;

    let response = send(&app, "GET", "/api/stats", None, None).await;
    let stats: Stats = common::json_body(response).await;
    assert_eq!(stats.total_discounts, 2);
    assert_eq!(stats.active_discounts, 1);
    assert_eq!(stats.total_profiles, 2);

    let response = send(&app, "GET", "/api/health", None, None).await;
    let health: HealthResponse = common::json_body(response).await;
    assert_eq!(health.status, "ok");
    assert_eq!(health.discounts, 2);
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let (app, state) = common::create_test_app().await;
    let token = common::admin_token(&state);

    let response = send(&app, "GET", "/api/export", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bundle: ExportBundle = common::json_body(response).await;
    assert_eq!(bundle.version, EXPORT_VERSION);
    assert_eq!(bundle.discounts.len(), 2);

    let response = send(&app, "POST", "/api/clear", Some(&token), None).await;
    let cleared: DataSnapshot = common::json_body(response).await;
    assert_eq!(cleared, DataSnapshot::default());
    assert_eq!(state.db.counts().await, (0, 0));

    let response = send(
        &app,
        "POST",
        "/api/import",
        Some(&token),
        Some(serde_json::to_value(&bundle).unwrap()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let imported: DataSnapshot = common::json_body(response).await;
    assert_eq!(imported, bundle.snapshot());
    assert_eq!(state.db.snapshot().await, bundle.snapshot());
}

#[tokio::test]
async fn test_restore_defaults_after_clear() {
    let (app, state) = common::create_test_app().await;
    let token = common::admin_token(&state);
    let original: Vec<Offer> = state.db.list().await;

    send(&app, "POST", "/api/clear", Some(&token), None).await;
    let response = send(&app, "POST", "/api/restore-defaults", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let restored: DataSnapshot = common::json_body(response).await;
    assert_eq!(restored.discounts.len(), 2);
    assert_eq!(restored.profiles.len(), 2);
    // Fresh ids, never reused
    assert!(restored
        .discounts
        .iter()
        .all(|o| original.iter().all(|old| old.id != o.id)));
}
