// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process catalog store for the backend.
//!
//! Provides typed operations for:
//! - Offers and profiles (CRUD, active filtering)
//! - Whole-catalog snapshots (export, import, restore, clear)
//! - Dashboard counters
//!
//! Collections keep insertion order. Ids are decimal strings drawn from a
//! counter that only moves forward, so a deleted id is never handed out
//! again.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::error::AppError;
use crate::models::{DataSnapshot, Offer, Profile, Record, Stats};
use crate::services::seed;

/// Both collections plus the id counter.
#[derive(Default)]
pub struct Collections {
    discounts: Vec<Offer>,
    profiles: Vec<Profile>,
    next_id: u64,
}

impl Collections {
    fn allocate_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = self.next_id.to_string();
            // Imported data may already use small decimal ids.
            let taken = self.discounts.iter().any(|o| o.id == id)
                || self.profiles.iter().any(|p| p.id == id);
            if !taken {
                return id;
            }
        }
    }

    fn install(&mut self, snapshot: DataSnapshot) {
        self.discounts = snapshot.discounts;
        self.profiles = snapshot.profiles;
    }

    fn snapshot(&self) -> DataSnapshot {
        DataSnapshot {
            discounts: self.discounts.clone(),
            profiles: self.profiles.clone(),
        }
    }
}

/// Per-type access to the matching collection.
pub trait Stored: Record {
    fn items(collections: &Collections) -> &Vec<Self>;
    fn items_mut(collections: &mut Collections) -> &mut Vec<Self>;
}

impl Stored for Offer {
    fn items(collections: &Collections) -> &Vec<Self> {
        &collections.discounts
    }

    fn items_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.discounts
    }
}

impl Stored for Profile {
    fn items(collections: &Collections) -> &Vec<Self> {
        &collections.profiles
    }

    fn items_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.profiles
    }
}

/// Catalog database shared by all request handlers.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryDb {
    /// Empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Database holding the demo catalog.
    pub async fn seeded() -> Self {
        let db = Self::new();
        db.restore_defaults().await;
        db
    }

    // ─── Catalog operations ──────────────────────────────────────

    pub async fn list<T: Stored>(&self) -> Vec<T> {
        T::items(&*self.inner.read().await).clone()
    }

    pub async fn list_active<T: Stored>(&self) -> Vec<T> {
        T::items(&*self.inner.read().await)
            .iter()
            .filter(|item| item.is_active())
            .cloned()
            .collect()
    }

    pub async fn get<T: Stored>(&self, id: &str) -> Result<T, AppError> {
        T::items(&*self.inner.read().await)
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Validate and store a new record with a fresh id.
    pub async fn insert<T: Stored>(&self, input: T::New) -> Result<T, AppError> {
        input.validate()?;

        let mut collections = self.inner.write().await;
        let id = collections.allocate_id();
        let item = T::create(input, id, Utc::now());
        T::items_mut(&mut collections).push(item.clone());

        tracing::info!(kind = T::KIND, id = item.id(), "Created");
        Ok(item)
    }

    /// Apply a patch. The merged record must still validate, otherwise
    /// nothing changes.
    pub async fn update<T: Stored>(&self, id: &str, patch: T::Patch) -> Result<T, AppError> {
        let mut collections = self.inner.write().await;
        let slot = T::items_mut(&mut collections)
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;

        let mut candidate = slot.clone();
        candidate.apply_patch(patch);
        candidate.validate()?;
        *slot = candidate.clone();

        tracing::info!(kind = T::KIND, id, "Updated");
        Ok(candidate)
    }

    pub async fn delete<T: Stored>(&self, id: &str) -> Result<(), AppError> {
        let mut collections = self.inner.write().await;
        let items = T::items_mut(&mut collections);
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Err(not_found::<T>(id));
        }

        tracing::info!(kind = T::KIND, id, "Deleted");
        Ok(())
    }

    // ─── Bulk operations ─────────────────────────────────────────

    pub async fn snapshot(&self) -> DataSnapshot {
        self.inner.read().await.snapshot()
    }

    /// Replace the whole catalog. The snapshot is checked first and the
    /// catalog is left untouched if it fails.
    pub async fn replace(&self, snapshot: DataSnapshot) -> Result<DataSnapshot, AppError> {
        snapshot.check().map_err(AppError::BadRequest)?;

        let mut collections = self.inner.write().await;
        collections.install(snapshot);
        tracing::info!(
            discounts = collections.discounts.len(),
            profiles = collections.profiles.len(),
            "Catalog replaced"
        );
        Ok(collections.snapshot())
    }

    /// Put the demo catalog back, with fresh ids.
    pub async fn restore_defaults(&self) -> DataSnapshot {
        let mut collections = self.inner.write().await;
        collections.install(DataSnapshot::default());
        let snapshot = seed::demo_snapshot(|| collections.allocate_id());
        collections.install(snapshot);
        tracing::info!("Demo catalog restored");
        collections.snapshot()
    }

    pub async fn clear(&self) -> DataSnapshot {
        let mut collections = self.inner.write().await;
        collections.install(DataSnapshot::default());
        tracing::info!("Catalog cleared");
        collections.snapshot()
    }

    pub async fn stats(&self) -> Stats {
        let collections = self.inner.read().await;
        Stats::from_collections(&collections.discounts, &collections.profiles)
    }

    /// `(discounts, profiles)` sizes.
    pub async fn counts(&self) -> (usize, usize) {
        let collections = self.inner.read().await;
        (collections.discounts.len(), collections.profiles.len())
    }
}

fn not_found<T: Record>(id: &str) -> AppError {
    AppError::NotFound(format!("{} {}", T::KIND, id))
}
