// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bulk admin routes: export, import, restore demo data, clear.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{DataSnapshot, ExportBundle};
use crate::routes::catalog::json_body;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/export", get(export))
        .route("/api/import", post(import))
        .route("/api/restore-defaults", post(restore_defaults))
        .route("/api/clear", post(clear))
}

async fn export(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<ExportBundle> {
    let bundle = ExportBundle::new(state.db.snapshot().await, None);
    tracing::info!(
        username = %user.username,
        exported_at = %format_utc_rfc3339(bundle.export_date),
        discounts = bundle.discounts.len(),
        profiles = bundle.profiles.len(),
        "Catalog exported"
    );
    Json(bundle)
}

/// Replace both collections with the uploaded bundle.
async fn import(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<ExportBundle>, JsonRejection>,
) -> Result<Json<DataSnapshot>> {
    let bundle = json_body(payload)?;
    tracing::info!(
        username = %user.username,
        version = %bundle.version,
        "Importing catalog"
    );
    Ok(Json(state.db.replace(bundle.snapshot()).await?))
}

async fn restore_defaults(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<DataSnapshot> {
    tracing::info!(username = %user.username, "Restoring demo catalog");
    Json(state.db.restore_defaults().await)
}

async fn clear(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<DataSnapshot> {
    tracing::warn!(username = %user.username, "Clearing catalog");
    Json(state.db.clear().await)
}
