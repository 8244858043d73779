// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offer and profile routes.
//!
//! Both collections expose the same shape under `/api/<collection>`:
//! reads are public, writes need an admin session.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::Stored;
use crate::error::{AppError, Result};
use crate::AppState;

/// Read-only routes for one collection.
pub fn public_routes<T: Stored>() -> Router<Arc<AppState>> {
    let base = format!("/api/{}", T::COLLECTION);
    Router::new()
        .route(&base, get(list::<T>))
        .route(&format!("{}/active", base), get(list_active::<T>))
        .route(&format!("{}/{{id}}", base), get(get_one::<T>))
}

/// Mutating routes for one collection.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn admin_routes<T: Stored>() -> Router<Arc<AppState>> {
    let base = format!("/api/{}", T::COLLECTION);
    Router::new()
        .route(&base, axum::routing::post(create::<T>))
        .route(
            &format!("{}/{{id}}", base),
            put(update::<T>).delete(remove::<T>),
        )
}

/// Unwrap a JSON body, turning axum's rejection into our 400 shape.
pub(crate) fn json_body<B>(payload: std::result::Result<Json<B>, JsonRejection>) -> Result<B> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn list<T: Stored>(State(state): State<Arc<AppState>>) -> Json<Vec<T>> {
    Json(state.db.list::<T>().await)
}

async fn list_active<T: Stored>(State(state): State<Arc<AppState>>) -> Json<Vec<T>> {
    Json(state.db.list_active::<T>().await)
}

async fn get_one<T: Stored>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<T>> {
    Ok(Json(state.db.get::<T>(&id).await?))
}

async fn create<T: Stored>(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<T::New>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<T>)> {
    let input = json_body(payload)?;
    let created = state.db.insert::<T>(input).await?;
    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

async fn update<T: Stored>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<T::Patch>, JsonRejection>,
) -> Result<Json<T>> {
    let patch = json_body(payload)?;
    Ok(Json(state.db.update::<T>(&id, patch).await?))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
}

async fn remove<T: Stored>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.db.delete::<T>(&id).await?;
    Ok(Json(DeleteResponse { success: true, id }))
}
