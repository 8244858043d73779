// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::{to_bytes, Body};
use axum::http::Response;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use youth_council::config::Config;
use youth_council::db::MemoryDb;
use youth_council::middleware::auth::create_jwt;
use youth_council::routes::create_router;
use youth_council::services::{DataManager, LocalStore, RemoteClient};
use youth_council::AppState;

/// Create a test app backed by the seeded demo catalog.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: MemoryDb::seeded().await,
    });
    (create_router(state.clone()), state)
}

/// Admin session token signed with the test key.
#[allow(dead_code)]
pub fn admin_token(state: &AppState) -> String {
    create_jwt(&state.config.admin_username, &state.config.jwt_signing_key).unwrap()
}

/// Read a whole response body as JSON.
#[allow(dead_code)]
pub async fn json_body<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The real router listening on an ephemeral localhost port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start() -> Self {
        let (_, state) = create_test_app().await;
        Self::start_with(state).await
    }

    pub async fn start_with(state: Arc<AppState>) -> Self {
        Self::start_on(SocketAddr::from(([127, 0, 0, 1], 0)), state).await
    }

    /// Serve on a specific address, e.g. to bring a stopped server back.
    pub async fn start_on(addr: SocketAddr, state: Arc<AppState>) -> Self {
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(state.clone());
        let (shutdown, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    /// Base URL including the `/api` prefix.
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Stop accepting connections. Later requests fail to connect.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        if let Some(task) = self.task.take() {
            // Graceful shutdown waits for open connections; don't hang on a
            // pooled keep-alive that the client never closes.
            if tokio::time::timeout(Duration::from_secs(2), task).await.is_err() {
                panic!("test server did not shut down");
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// A URL nothing is listening on.
#[allow(dead_code)]
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

/// Remote client with a short timeout, pointed at `api_url`.
#[allow(dead_code)]
pub fn remote_client(api_url: &str) -> RemoteClient {
    RemoteClient::new(api_url, Duration::from_secs(5))
}

/// Facade over `api_url` with in-memory local storage and the test
/// admin credentials for offline login.
#[allow(dead_code)]
pub fn data_manager(api_url: &str, store: LocalStore) -> DataManager {
    let config = Config::test_default();
    DataManager::new(remote_client(api_url), store).with_offline_credentials(
        youth_council::models::Credentials::new(config.admin_username, config.admin_password),
    )
}
