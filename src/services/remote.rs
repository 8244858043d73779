// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Council API client.
//!
//! Handles:
//! - Catalog CRUD for offers and profiles
//! - Admin login and session verification (bearer token)
//! - Bulk export/import/restore/clear and dashboard stats
//! - The `/health` reachability probe
//!
//! Every failure is classified at this boundary: `Connectivity` when no
//! response arrived, `Application` when the API answered non-2xx, `Decode`
//! when a 2xx body did not parse.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::Config;
use crate::error::{ErrorResponse, RemoteError};
use crate::models::{
    Credentials, DataSnapshot, ExportBundle, HealthResponse, LoginResponse, Record, Stats,
    VerifyResponse,
};

/// Longest error body excerpt kept in `RemoteError::Application::details`.
const MAX_ERROR_DETAILS: usize = 512;

/// Council API client.
///
/// Clones share the bearer token.
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl RemoteClient {
    /// Create a client for the API rooted at `base_url` (including `/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("youth-council/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "HTTP client setup failed, using defaults");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    // ─── Health ──────────────────────────────────────────────────

    /// Reachability probe. Never sends the bearer token.
    pub async fn health(&self) -> Result<HealthResponse, RemoteError> {
        let request = self.http.get(self.url("/health"));
        Self::send_json(request).await
    }

    // ─── Catalog (offers & profiles) ─────────────────────────────

    pub async fn list<T: Record>(&self) -> Result<Vec<T>, RemoteError> {
        self.call(Method::GET, &format!("/{}", T::COLLECTION), None::<&()>)
            .await
    }

    pub async fn list_active<T: Record>(&self) -> Result<Vec<T>, RemoteError> {
        self.call(Method::GET, &format!("/{}/active", T::COLLECTION), None::<&()>)
            .await
    }

    pub async fn get<T: Record>(&self, id: &str) -> Result<T, RemoteError> {
        self.call(Method::GET, &Self::item_path::<T>(id), None::<&()>)
            .await
    }

    pub async fn create<T: Record>(&self, input: &T::New) -> Result<T, RemoteError> {
        self.call(Method::POST, &format!("/{}", T::COLLECTION), Some(input))
            .await
    }

    pub async fn update<T: Record>(&self, id: &str, patch: &T::Patch) -> Result<T, RemoteError> {
        self.call(Method::PUT, &Self::item_path::<T>(id), Some(patch))
            .await
    }

    pub async fn delete<T: Record>(&self, id: &str) -> Result<(), RemoteError> {
        let _: IgnoredAny = self
            .call(Method::DELETE, &Self::item_path::<T>(id), None::<&()>)
            .await?;
        Ok(())
    }

    // ─── Auth ────────────────────────────────────────────────────

    /// Log in and keep the returned token for later admin calls.
    ///
    /// A rejected login surfaces as `RemoteError::Application` with status 401.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, RemoteError> {
        let response: LoginResponse = self
            .call(Method::POST, "/auth/login", Some(credentials))
            .await?;
        if let Some(token) = response.token.as_ref().filter(|_| response.success) {
            self.set_token(Some(token.clone()));
        }
        Ok(response)
    }

    pub async fn verify(&self) -> Result<VerifyResponse, RemoteError> {
        self.call(Method::GET, "/auth/verify", None::<&()>).await
    }

    // ─── Bulk admin operations ───────────────────────────────────

    pub async fn export(&self) -> Result<ExportBundle, RemoteError> {
        self.call(Method::GET, "/export", None::<&()>).await
    }

    pub async fn import(&self, bundle: &ExportBundle) -> Result<DataSnapshot, RemoteError> {
        self.call(Method::POST, "/import", Some(bundle)).await
    }

    pub async fn restore_defaults(&self) -> Result<DataSnapshot, RemoteError> {
        self.call(Method::POST, "/restore-defaults", None::<&()>)
            .await
    }

    pub async fn clear(&self) -> Result<DataSnapshot, RemoteError> {
        self.call(Method::POST, "/clear", None::<&()>).await
    }

    pub async fn stats(&self) -> Result<Stats, RemoteError> {
        self.call(Method::GET, "/stats", None::<&()>).await
    }

    // ─── Plumbing ────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn item_path<T: Record>(id: &str) -> String {
        format!("/{}/{}", T::COLLECTION, urlencoding::encode(id))
    }

    /// Build, authenticate and send a request, then parse the JSON reply.
    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::send_json(request).await
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Connectivity(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Connectivity(format!("Response body lost: {}", e)))?;

        if !status.is_success() {
            let err = application_error(status, &body);
            tracing::debug!(status = status.as_u16(), error = %err, "API returned an error");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Turn a non-2xx reply into `RemoteError::Application`, keeping the
/// machine-readable `{error, details}` body when there is one.
fn application_error(status: StatusCode, body: &[u8]) -> RemoteError {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(parsed) => RemoteError::Application {
            status: status.as_u16(),
            error: parsed.error,
            details: parsed.details,
        },
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let details = text.trim();
            RemoteError::Application {
                status: status.as_u16(),
                error: status
                    .canonical_reason()
                    .unwrap_or("unknown_error")
                    .to_string(),
                details: (!details.is_empty())
                    .then(|| details.chars().take(MAX_ERROR_DETAILS).collect()),
            }
        }
    }
}
