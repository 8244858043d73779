// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data-access facade used by the mini-app and the admin panel.
//!
//! Every operation follows the same rules:
//! 1. If the remote is enabled, try the API once.
//!    - Success: mark the remote reachable, write list and mutation results
//!      through to local storage, return the API's answer.
//!    - Connectivity failure: mark the remote unreachable and run the same
//!      operation against local storage instead. Reads return whatever is
//!      cached; writes land locally with a locally generated id.
//!    - Application failure (the API answered non-2xx): return it.
//! 2. If the remote is disabled, use local storage only.
//!
//! Writes made while offline stay local. Nothing queues or replays them
//! once the API is back.

use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use subtle::ConstantTimeEq;
use validator::Validate;

use crate::config::Config;
use crate::error::{DataError, RemoteError};
use crate::models::{
    upsert, AdminUser, Credentials, DataSnapshot, ExportBundle, LoginResponse, NewOffer,
    NewProfile, Offer, OfferPatch, Profile, ProfilePatch, Record, Settings, Stats,
};
use crate::services::ids::generate_id;
use crate::services::local_store::LocalStore;
use crate::services::remote::RemoteClient;
use crate::services::seed;

/// Which store answers calls right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Remote enabled and last seen reachable
    Remote,
    /// Remote enabled but the last attempt could not reach it
    RemoteOffline,
    /// Local storage only
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataStatus {
    pub remote_enabled: bool,
    pub remote_reachable: bool,
    pub mode: Mode,
}

/// Data-access facade over the council API and local storage.
pub struct DataManager {
    remote: RemoteClient,
    store: LocalStore,
    /// Used to authenticate admin logins while the API is unreachable.
    offline_credentials: Option<Credentials>,
    remote_enabled: AtomicBool,
    remote_reachable: AtomicBool,
}

impl DataManager {
    /// Create a facade with the remote enabled. A token persisted by an
    /// earlier session is handed to the client.
    pub fn new(remote: RemoteClient, store: LocalStore) -> Self {
        if let Some(token) = store.admin_token() {
            remote.set_token(Some(token));
        }
        Self {
            remote,
            store,
            offline_credentials: None,
            remote_enabled: AtomicBool::new(true),
            remote_reachable: AtomicBool::new(true),
        }
    }

    /// Local-only facade; the remote client is never called.
    pub fn local_only(store: LocalStore) -> Self {
        let manager = Self::new(RemoteClient::new("http://localhost", Duration::from_secs(1)), store);
        manager.set_remote_enabled(false);
        manager
    }

    pub fn from_config(config: &Config) -> Self {
        let manager = Self::new(
            RemoteClient::from_config(config),
            LocalStore::on_disk(&config.storage_dir),
        )
        .with_offline_credentials(Credentials::new(
            config.admin_username.clone(),
            config.admin_password.clone(),
        ));
        if config.local_only {
            manager.set_remote_enabled(false);
        }
        manager
    }

    pub fn with_offline_credentials(mut self, credentials: Credentials) -> Self {
        self.offline_credentials = Some(credentials);
        self
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    // ─── Mode ────────────────────────────────────────────────────

    pub fn remote_enabled(&self) -> bool {
        self.remote_enabled.load(Ordering::Relaxed)
    }

    pub fn remote_reachable(&self) -> bool {
        self.remote_reachable.load(Ordering::Relaxed)
    }

    /// Switch between API-backed and local-only operation.
    pub fn set_remote_enabled(&self, enabled: bool) {
        self.remote_enabled.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.remote_reachable.store(false, Ordering::Relaxed);
        }
    }

    pub fn status(&self) -> DataStatus {
        let remote_enabled = self.remote_enabled();
        let remote_reachable = self.remote_reachable();
        let mode = match (remote_enabled, remote_reachable) {
            (false, _) => Mode::Local,
            (true, true) => Mode::Remote,
            (true, false) => Mode::RemoteOffline,
        };
        DataStatus {
            remote_enabled,
            remote_reachable,
            mode,
        }
    }

    /// Probe `/health` and record the outcome.
    pub async fn check_server_status(&self) -> bool {
        let reachable = match self.remote.health().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
                false
            }
        };
        self.remote_reachable.store(reachable, Ordering::Relaxed);
        reachable
    }

    /// Start-up: demote to local-only if the API is down, then make sure
    /// local-only mode has a settings record and demo data.
    pub async fn initialize(&self) -> Result<DataStatus, DataError> {
        if self.remote_enabled() && !self.check_server_status().await {
            tracing::warn!(
                api = %self.remote.base_url(),
                "API unreachable at startup, switching to local mode"
            );
            self.set_remote_enabled(false);
        }

        if !self.remote_enabled() {
            self.seed_local_data()?;
        }

        let status = self.status();
        tracing::info!(mode = ?status.mode, "Data manager initialized");
        Ok(status)
    }

    fn seed_local_data(&self) -> Result<(), DataError> {
        let mut settings = self.store.settings().unwrap_or_else(|| Settings::new(true));
        if settings.demo_data_initialized {
            return Ok(());
        }

        tracing::info!("Seeding demo data for local mode");
        self.store
            .replace_snapshot(&seed::demo_snapshot(generate_id))?;

        settings.use_local_mode = true;
        settings.demo_data_initialized = true;
        settings.demo_data_initialized_at = Some(Utc::now());
        self.store.set_settings(&settings)?;
        Ok(())
    }

    // ─── Offers ──────────────────────────────────────────────────

    pub async fn list_offers(&self) -> Result<Vec<Offer>, DataError> {
        self.list().await
    }

    pub async fn list_active_offers(&self) -> Result<Vec<Offer>, DataError> {
        self.list_active().await
    }

    pub async fn get_offer(&self, id: &str) -> Result<Option<Offer>, DataError> {
        self.get(id).await
    }

    pub async fn add_offer(&self, input: NewOffer) -> Result<Offer, DataError> {
        self.add::<Offer>(input).await
    }

    pub async fn update_offer(&self, id: &str, patch: OfferPatch) -> Result<Offer, DataError> {
        self.update::<Offer>(id, patch).await
    }

    pub async fn toggle_offer_active(&self, id: &str) -> Result<Offer, DataError> {
        self.toggle_active::<Offer>(id).await
    }

    pub async fn delete_offer(&self, id: &str) -> Result<(), DataError> {
        self.delete::<Offer>(id).await
    }

    // ─── Profiles ────────────────────────────────────────────────

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, DataError> {
        self.list().await
    }

    pub async fn list_active_profiles(&self) -> Result<Vec<Profile>, DataError> {
        self.list_active().await
    }

    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>, DataError> {
        self.get(id).await
    }

    pub async fn add_profile(&self, input: NewProfile) -> Result<Profile, DataError> {
        self.add::<Profile>(input).await
    }

    pub async fn update_profile(
        &self,
        id: &str,
        patch: ProfilePatch,
    ) -> Result<Profile, DataError> {
        self.update::<Profile>(id, patch).await
    }

    pub async fn toggle_profile_active(&self, id: &str) -> Result<Profile, DataError> {
        self.toggle_active::<Profile>(id).await
    }

    pub async fn delete_profile(&self, id: &str) -> Result<(), DataError> {
        self.delete::<Profile>(id).await
    }

    /// First profile whose Telegram handle contains `query`, ignoring case.
    pub async fn find_profile_by_telegram(&self, query: &str) -> Result<Option<Profile>, DataError> {
        let profiles: Vec<Profile> = self.list().await?;
        Ok(profiles.into_iter().find(|p| p.matches_telegram(query)))
    }

    // ─── Auth ────────────────────────────────────────────────────

    /// Admin login.
    ///
    /// A wrong password is a normal outcome (`success: false`), not an
    /// error. While the API is unreachable the configured offline
    /// credentials are checked instead and only the local auth flag is set.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, DataError> {
        match self.attempt("login", self.remote.login(credentials)).await {
            Ok(Some(response)) => {
                if response.success {
                    self.store.set_admin_token(response.token.as_deref())?;
                    self.store.set_admin_auth(true)?;
                    tracing::info!(username = %credentials.username, "Admin logged in");
                }
                Ok(response)
            }
            Ok(None) => self.login_offline(credentials),
            Err(DataError::Remote(RemoteError::Application {
                status: 401, error, ..
            })) => {
                tracing::info!(username = %credentials.username, "Admin login rejected");
                Ok(LoginResponse::rejected(error))
            }
            Err(e) => Err(e),
        }
    }

    fn login_offline(&self, credentials: &Credentials) -> Result<LoginResponse, DataError> {
        let Some(expected) = &self.offline_credentials else {
            return Ok(LoginResponse::rejected("Offline login is not configured"));
        };

        let username_ok = expected
            .username
            .as_bytes()
            .ct_eq(credentials.username.as_bytes());
        let password_ok = expected
            .password
            .as_bytes()
            .ct_eq(credentials.password.as_bytes());

        if !bool::from(username_ok & password_ok) {
            tracing::info!(username = %credentials.username, "Offline admin login rejected");
            return Ok(LoginResponse::rejected("Invalid username or password"));
        }

        self.store.set_admin_auth(true)?;
        tracing::info!(username = %credentials.username, "Admin logged in offline");
        Ok(LoginResponse {
            success: true,
            token: None,
            user: Some(AdminUser {
                username: credentials.username.clone(),
                role: "administrator".to_string(),
            }),
            error: None,
        })
    }

    /// Whether an admin session is active.
    ///
    /// Offline, a stored token or the local auth flag counts as logged in.
    pub async fn check_auth(&self) -> Result<bool, DataError> {
        match self.attempt("check_auth", self.remote.verify()).await {
            Ok(Some(verdict)) => {
                if !verdict.valid {
                    self.forget_session()?;
                }
                Ok(verdict.valid)
            }
            Ok(None) => Ok(self.store.admin_auth() || self.store.admin_token().is_some()),
            Err(DataError::Remote(e)) if e.is_unauthorized() => {
                self.forget_session()?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the session token and the local auth flag.
    pub fn logout(&self) -> Result<(), DataError> {
        self.forget_session()?;
        tracing::info!("Admin logged out");
        Ok(())
    }

    fn forget_session(&self) -> Result<(), DataError> {
        self.remote.set_token(None);
        self.store.set_admin_token(None)?;
        self.store.set_admin_auth(false)?;
        Ok(())
    }

    // ─── Bulk operations ─────────────────────────────────────────

    pub async fn export_all(&self) -> Result<ExportBundle, DataError> {
        if let Some(bundle) = self.attempt("export_all", self.remote.export()).await? {
            self.mirror_snapshot(&bundle.snapshot());
            return Ok(bundle);
        }
        Ok(ExportBundle::new(self.store.snapshot(), self.store.settings()))
    }

    /// Replace both collections with the bundle's contents.
    pub async fn import_all(&self, bundle: &ExportBundle) -> Result<DataSnapshot, DataError> {
        bundle.snapshot().check().map_err(DataError::Validation)?;

        if let Some(snapshot) = self.attempt("import_all", self.remote.import(bundle)).await? {
            self.mirror_snapshot(&snapshot);
            return Ok(snapshot);
        }

        let snapshot = bundle.snapshot();
        self.store.replace_snapshot(&snapshot)?;
        if let Some(settings) = &bundle.settings {
            self.store.set_settings(settings)?;
        }
        tracing::info!(
            discounts = snapshot.discounts.len(),
            profiles = snapshot.profiles.len(),
            "Imported data into local storage"
        );
        Ok(snapshot)
    }

    pub async fn restore_defaults(&self) -> Result<DataSnapshot, DataError> {
        if let Some(snapshot) = self
            .attempt("restore_defaults", self.remote.restore_defaults())
            .await?
        {
            self.mirror_snapshot(&snapshot);
            return Ok(snapshot);
        }

        let snapshot = seed::demo_snapshot(generate_id);
        self.store.replace_snapshot(&snapshot)?;
        Ok(snapshot)
    }

    pub async fn clear_all(&self) -> Result<(), DataError> {
        if let Some(snapshot) = self.attempt("clear_all", self.remote.clear()).await? {
            self.mirror_snapshot(&snapshot);
            return Ok(());
        }
        self.store.replace_snapshot(&DataSnapshot::default())?;
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<Stats, DataError> {
        if let Some(stats) = self.attempt("get_stats", self.remote.stats()).await? {
            return Ok(stats);
        }
        Ok(Stats::from_collections(
            &self.store.offers(),
            &self.store.profiles(),
        ))
    }

    // ─── Generic catalog operations ──────────────────────────────

    async fn list<T: Record>(&self) -> Result<Vec<T>, DataError> {
        if let Some(items) = self.attempt(T::COLLECTION, self.remote.list::<T>()).await? {
            self.mirror(|| self.store.replace(&items));
            return Ok(items);
        }
        Ok(self.store.list())
    }

    async fn list_active<T: Record>(&self) -> Result<Vec<T>, DataError> {
        if let Some(active) = self
            .attempt(T::COLLECTION, self.remote.list_active::<T>())
            .await?
        {
            // Cached entries the API no longer lists as active were
            // deactivated, not deleted.
            self.mirror(|| {
                self.store.update::<T, _, DataError>(|cached| {
                    for c in cached.iter_mut() {
                        if c.is_active() && !active.iter().any(|a| a.id() == c.id()) {
                            c.apply_patch(T::active_patch(false));
                        }
                    }
                    for item in &active {
                        upsert(cached, item.clone());
                    }
                    Ok(())
                })
            });
            return Ok(active);
        }
        Ok(self
            .store
            .list::<T>()
            .into_iter()
            .filter(|item| item.is_active())
            .collect())
    }

    async fn get<T: Record>(&self, id: &str) -> Result<Option<T>, DataError> {
        match self.attempt(T::KIND, self.remote.get::<T>(id)).await {
            Ok(Some(item)) => Ok(Some(item)),
            Ok(None) => Ok(self.store.find(id)),
            Err(DataError::Remote(e)) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add<T: Record>(&self, input: T::New) -> Result<T, DataError> {
        input.validate()?;

        if let Some(created) = self.attempt(T::KIND, self.remote.create::<T>(&input)).await? {
            self.mirror(|| {
                self.store.update::<T, _, DataError>(|cached| {
                    upsert(cached, created.clone());
                    Ok(())
                })
            });
            return Ok(created);
        }

        let created = T::create(input, generate_id(), Utc::now());
        self.store.update::<T, _, DataError>(|cached| {
            cached.push(created.clone());
            Ok(())
        })?;
        tracing::info!(kind = T::KIND, id = created.id(), "Created locally");
        Ok(created)
    }

    async fn update<T: Record>(&self, id: &str, patch: T::Patch) -> Result<T, DataError> {
        if let Some(updated) = self
            .attempt(T::KIND, self.remote.update::<T>(id, &patch))
            .await?
        {
            self.mirror(|| {
                self.store.update::<T, _, DataError>(|cached| {
                    upsert(cached, updated.clone());
                    Ok(())
                })
            });
            return Ok(updated);
        }

        self.store.update::<T, _, DataError>(|cached| {
            let slot = cached
                .iter_mut()
                .find(|item| item.id() == id)
                .ok_or_else(|| not_found::<T>(id))?;
            let mut candidate = slot.clone();
            candidate.apply_patch(patch);
            candidate.validate()?;
            *slot = candidate.clone();
            Ok(candidate)
        })
    }

    async fn toggle_active<T: Record>(&self, id: &str) -> Result<T, DataError> {
        let current: T = self.get(id).await?.ok_or_else(|| not_found::<T>(id))?;
        self.update::<T>(id, T::active_patch(!current.is_active()))
            .await
    }

    async fn delete<T: Record>(&self, id: &str) -> Result<(), DataError> {
        if self
            .attempt(T::KIND, self.remote.delete::<T>(id))
            .await?
            .is_some()
        {
            self.mirror(|| {
                self.store.update::<T, _, DataError>(|cached| {
                    cached.retain(|item| item.id() != id);
                    Ok(())
                })
            });
            return Ok(());
        }

        self.store.update::<T, _, DataError>(|cached| {
            let before = cached.len();
            cached.retain(|item| item.id() != id);
            if cached.len() == before {
                return Err(not_found::<T>(id));
            }
            Ok(())
        })
    }

    // ─── Plumbing ────────────────────────────────────────────────

    /// Run one remote call if the remote is enabled.
    ///
    /// `Ok(Some)` is the API's answer, `Ok(None)` means "use local storage"
    /// (remote disabled or unreachable), `Err` is an application error.
    async fn attempt<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<Option<T>, DataError> {
        if !self.remote_enabled() {
            return Ok(None);
        }

        match call.await {
            Ok(value) => {
                self.remote_reachable.store(true, Ordering::Relaxed);
                Ok(Some(value))
            }
            Err(e) if e.is_connectivity() => {
                self.remote_reachable.store(false, Ordering::Relaxed);
                tracing::warn!(
                    operation,
                    error = %e,
                    "API unreachable, falling back to local storage"
                );
                Ok(None)
            }
            Err(e) => {
                // The API answered, so it is reachable.
                self.remote_reachable.store(true, Ordering::Relaxed);
                Err(e.into())
            }
        }
    }

    /// Write-through of a remote result. The remote call already
    /// succeeded, so a local failure is only logged.
    fn mirror<E: std::fmt::Display>(&self, write: impl FnOnce() -> Result<(), E>) {
        if let Err(e) = write() {
            tracing::warn!(error = %e, "Failed to mirror API result into local storage");
        }
    }

    fn mirror_snapshot(&self, snapshot: &DataSnapshot) {
        self.mirror(|| self.store.replace_snapshot(snapshot));
    }
}

fn not_found<T: Record>(id: &str) -> DataError {
    DataError::NotFound {
        collection: T::KIND,
        id: id.to_string(),
    }
}
