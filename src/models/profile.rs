// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Council member profile model.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::{default_true, nullable};
use crate::time_utils::touch;

/// A youth council member card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Telegram username, without or with a leading '@'
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Photo as a base64 data URI
    #[serde(default)]
    #[validate(custom(function = "validate_photo"))]
    pub photo: Option<String>,
    /// Role on the council, e.g. "Chair"
    #[serde(default)]
    pub position: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Merge a patch into this profile and advance `updated_at`.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(telegram) = patch.telegram {
            self.telegram = telegram;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(photo) = patch.photo {
            self.photo = photo;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = touch(self.updated_at);
    }

    /// Case-insensitive substring match against the Telegram handle.
    ///
    /// A leading '@' is ignored on both sides. An empty query matches nothing.
    pub fn matches_telegram(&self, query: &str) -> bool {
        let needle = normalize_handle(query);
        if needle.is_empty() {
            return false;
        }
        self.telegram
            .as_deref()
            .map(|handle| normalize_handle(handle).contains(&needle))
            .unwrap_or(false)
    }
}

fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_lowercase()
}

/// Input for creating a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_photo"))]
    pub photo: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            telegram: None,
            phone: None,
            photo: None,
            position: None,
            is_active: true,
        }
    }

    pub fn into_profile(self, id: String, now: DateTime<Utc>) -> Profile {
        Profile {
            id,
            name: self.name,
            telegram: self.telegram,
            phone: self.phone,
            photo: self.photo,
            position: self.position,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Merge patch for a profile. Nullable fields accept `null` to clear them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub telegram: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProfilePatch {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }
}

fn validate_photo(raw: &str) -> Result<(), ValidationError> {
    let valid = raw
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .filter(|(mime, _)| mime.starts_with("image/"))
        .map(|(_, payload)| STANDARD.decode(payload).is_ok())
        .unwrap_or(false);

    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new("photo");
    err.message = Some("expected a base64 image data URI".into());
    Err(err)
}
