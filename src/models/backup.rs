// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bulk data shapes: export bundles, import payloads, local settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Offer, Profile, Record};

/// Format version written into every export.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Both collections at once.
///
/// Returned by the bulk admin operations (import, restore, clear) so the
/// client can mirror the resulting state without a second round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(default)]
    pub discounts: Vec<Offer>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl DataSnapshot {
    /// Check every record and reject duplicate ids within a collection.
    pub fn check(&self) -> Result<(), String> {
        check_collection(&self.discounts)?;
        check_collection(&self.profiles)
    }
}

fn check_collection<T: Record>(items: &[T]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id()) {
            return Err(format!("duplicate {} id {:?}", T::KIND, item.id()));
        }
        item.validate()
            .map_err(|e| format!("{} {}: {}", T::KIND, item.id(), e))?;
    }
    Ok(())
}

/// Full export file, as downloaded from the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(default)]
    pub discounts: Vec<Offer>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub settings: Option<Settings>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportBundle {
    pub fn new(snapshot: DataSnapshot, settings: Option<Settings>) -> Self {
        Self {
            discounts: snapshot.discounts,
            profiles: snapshot.profiles,
            settings,
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    pub fn snapshot(&self) -> DataSnapshot {
        DataSnapshot {
            discounts: self.discounts.clone(),
            profiles: self.profiles.clone(),
        }
    }
}

/// Per-store initialization flags. Not business data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub initialized: bool,
    pub version: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_backup: Option<DateTime<Utc>>,
    #[serde(default)]
    pub use_local_mode: bool,
    #[serde(default)]
    pub demo_data_initialized: bool,
    #[serde(default)]
    pub demo_data_initialized_at: Option<DateTime<Utc>>,
}

impl Settings {
    pub fn new(use_local_mode: bool) -> Self {
        Self {
            initialized: true,
            version: EXPORT_VERSION.to_string(),
            created_at: Utc::now(),
            last_backup: None,
            use_local_mode,
            demo_data_initialized: false,
            demo_data_initialized_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewOffer};

    #[test]
    fn test_check_rejects_duplicate_ids() {
        let now = Utc::now();
        let offer = NewOffer::new("Coffee", Category::Food).into_offer("a1".into(), now);
        let mut snapshot = DataSnapshot {
            discounts: vec![offer.clone()],
            profiles: vec![],
        };
        assert!(snapshot.check().is_ok());

        snapshot.discounts.push(offer);
        let err = snapshot.check().unwrap_err();
        assert!(err.contains("duplicate offer id"));
    }

    #[test]
    fn test_export_bundle_wire_format() {
        let bundle = ExportBundle::new(DataSnapshot::default(), None);
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["version"], EXPORT_VERSION);
        assert!(json.get("exportDate").is_some());
        assert_eq!(json["discounts"], serde_json::json!([]));
    }
}
