// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic refresh of the catalog for long-lived views.
//!
//! The admin dashboard and the offer list re-read their data on a fixed
//! period so edits made elsewhere show up without a manual reload.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::DataError;
use crate::models::{Offer, Profile, Stats};
use crate::services::data_manager::{DataManager, DataStatus};

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Everything one refresh tick reads.
#[derive(Debug, Clone)]
pub struct RefreshSnapshot {
    pub offers: Vec<Offer>,
    pub profiles: Vec<Profile>,
    pub stats: Stats,
    pub status: DataStatus,
}

/// Running refresh loop. Dropping the handle stops it.
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn cancel(self) {
        // Drop does the work.
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read everything a dashboard shows, once.
pub async fn refresh_once(manager: &DataManager) -> Result<RefreshSnapshot, DataError> {
    let offers = manager.list_offers().await?;
    let profiles = manager.list_profiles().await?;
    let stats = manager.get_stats().await?;
    Ok(RefreshSnapshot {
        offers,
        profiles,
        stats,
        status: manager.status(),
    })
}

/// Call `on_refresh` with fresh data immediately and then every `period`.
///
/// A slow tick delays the next one instead of bunching them up. Errors
/// are passed to the callback and the loop keeps going.
pub fn spawn_refresh<F>(manager: Arc<DataManager>, period: Duration, mut on_refresh: F) -> RefreshHandle
where
    F: FnMut(Result<RefreshSnapshot, DataError>) + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let result = refresh_once(&manager).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Periodic refresh failed");
            }
            on_refresh(result);
        }
    });

    tracing::debug!(period_ms = period.as_millis() as u64, "Started periodic refresh");
    RefreshHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::local_store::LocalStore;

    #[tokio::test]
    async fn test_refresh_once_reads_local_data() {
        let manager = DataManager::local_only(LocalStore::in_memory());
        manager.initialize().await.unwrap();

        let snapshot = refresh_once(&manager).await.unwrap();
        assert_eq!(snapshot.offers.len(), 2);
        assert_eq!(snapshot.stats.total_profiles, 2);
    }
}
