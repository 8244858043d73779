// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin login and session verification routes.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{bearer_token, create_jwt, verify_jwt};
use crate::models::{AdminUser, Credentials, LoginResponse, VerifyResponse};
use crate::routes::catalog::json_body;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
}

/// Check credentials and issue a session token.
///
/// A wrong username or password is a 401 carrying a `LoginResponse` with
/// `success: false`.
async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Response> {
    let credentials = json_body(payload)?;
    let config = &state.config;

    let username_ok = config
        .admin_username
        .as_bytes()
        .ct_eq(credentials.username.as_bytes());
    let password_ok = config
        .admin_password
        .as_bytes()
        .ct_eq(credentials.password.as_bytes());

    if !bool::from(username_ok & password_ok) {
        tracing::warn!(username = %credentials.username, "Failed admin login");
        let body = LoginResponse::rejected("Invalid username or password");
        return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    }

    let token = create_jwt(&credentials.username, &config.jwt_signing_key)?;
    tracing::info!(username = %credentials.username, "Admin logged in");

    Ok(Json(LoginResponse {
        success: true,
        token: Some(token),
        user: Some(AdminUser {
            username: credentials.username,
            role: "administrator".to_string(),
        }),
        error: None,
    })
    .into_response())
}

/// Report whether the bearer token is still good.
async fn verify(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<VerifyResponse>> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    verify_jwt(token, &state.config.jwt_signing_key)?;
    Ok(Json(VerifyResponse { valid: true }))
}
