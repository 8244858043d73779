// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Discount offer model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::{default_true, nullable};
use crate::time_utils::touch;

/// Offer category shown as a filter chip in the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Category {
    Food,
    Entertainment,
    Education,
    Sports,
    Shopping,
    #[default]
    Other,
}

/// A discount or promotion shown in the mini-app feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Offer {
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    /// "lat, lng" for the map pin
    #[serde(default)]
    #[validate(custom(function = "validate_coordinates"))]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub category: Category,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Merge a patch into this offer and advance `updated_at`.
    pub fn apply(&mut self, patch: OfferPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(coordinates) = patch.coordinates {
            self.coordinates = coordinates;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = touch(self.updated_at);
    }
}

/// Input for creating an offer. The id and timestamps are assigned by
/// whichever store accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = "validate_coordinates"))]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewOffer {
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            coordinates: None,
            category,
            is_active: true,
        }
    }

    pub fn into_offer(self, id: String, now: DateTime<Utc>) -> Offer {
        Offer {
            id,
            title: self.title,
            description: self.description,
            coordinates: self.coordinates,
            category: self.category,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Merge patch for an offer. `coordinates: null` clears the pin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub coordinates: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl OfferPatch {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }
}

/// Parse "lat, lng" into a coordinate pair.
pub fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (lat, lng) = raw.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Some((lat, lng))
    } else {
        None
    }
}

fn validate_coordinates(raw: &str) -> Result<(), ValidationError> {
    if parse_coordinates(raw).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("coordinates");
    err.message = Some("expected \"lat, lng\" within valid ranges".into());
    Err(err)
}
