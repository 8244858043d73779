//! Aggregate counts for the admin dashboard and the health probe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Offer, Profile};

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Stats {
    pub total_discounts: usize,
    pub active_discounts: usize,
    pub total_profiles: usize,
    pub active_profiles: usize,
    pub last_update: DateTime<Utc>,
}

impl Stats {
    /// Count both collections as they are right now.
    pub fn from_collections(offers: &[Offer], profiles: &[Profile]) -> Self {
        Self {
            total_discounts: offers.len(),
            active_discounts: offers.iter().filter(|o| o.is_active).count(),
            total_profiles: profiles.len(),
            active_profiles: profiles.iter().filter(|p| p.is_active).count(),
            last_update: Utc::now(),
        }
    }
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub build_id: String,
    #[serde(default)]
    pub discounts: usize,
    #[serde(default)]
    pub profiles: usize,
}
