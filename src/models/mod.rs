// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models shared by the backend and the data-access layer.

pub mod auth;
pub mod backup;
pub mod offer;
pub mod profile;
pub mod stats;

pub use auth::{AdminUser, Credentials, LoginResponse, VerifyResponse};
pub use backup::{DataSnapshot, ExportBundle, Settings, EXPORT_VERSION};
pub use offer::{Category, NewOffer, Offer, OfferPatch};
pub use profile::{NewProfile, Profile, ProfilePatch};
pub use stats::{HealthResponse, Stats};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// A catalog entity (offer or profile) with an id, an active flag, and
/// create/patch inputs.
///
/// The backend store, the remote client, the local store and the
/// `DataManager` are all written once against this trait.
pub trait Record:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Validate + Send + Sync + 'static
{
    type New: Clone + Serialize + DeserializeOwned + Validate + Send + Sync + 'static;
    type Patch: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Singular name for logs and errors
    const KIND: &'static str;
    /// Collection name, used as the API path segment and the storage key suffix
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn is_active(&self) -> bool;
    fn create(new: Self::New, id: String, now: DateTime<Utc>) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);
    fn active_patch(is_active: bool) -> Self::Patch;
}

impl Record for Offer {
    type New = NewOffer;
    type Patch = OfferPatch;

    const KIND: &'static str = "offer";
    const COLLECTION: &'static str = "discounts";

    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn create(new: NewOffer, id: String, now: DateTime<Utc>) -> Self {
        new.into_offer(id, now)
    }

    fn apply_patch(&mut self, patch: OfferPatch) {
        self.apply(patch);
    }

    fn active_patch(is_active: bool) -> OfferPatch {
        OfferPatch::active(is_active)
    }
}

impl Record for Profile {
    type New = NewProfile;
    type Patch = ProfilePatch;

    const KIND: &'static str = "profile";
    const COLLECTION: &'static str = "profiles";

    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn create(new: NewProfile, id: String, now: DateTime<Utc>) -> Self {
        new.into_profile(id, now)
    }

    fn apply_patch(&mut self, patch: ProfilePatch) {
        self.apply(patch);
    }

    fn active_patch(is_active: bool) -> ProfilePatch {
        ProfilePatch::active(is_active)
    }
}

/// Replace-or-append by id, keeping insertion order.
pub fn upsert<T: Record>(items: &mut Vec<T>, item: T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

/// Deserialize a nullable patch field.
///
/// Absent stays `None` (via `#[serde(default)]`), explicit `null` becomes
/// `Some(None)`, and a value becomes `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn default_true() -> bool {
    true
}
