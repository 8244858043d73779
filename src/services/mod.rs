// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - data-access layer used by the mini-app and admin panel.

pub mod data_manager;
pub mod ids;
pub mod local_store;
pub mod refresh;
pub mod remote;
pub mod seed;

pub use data_manager::{DataManager, DataStatus, Mode};
pub use ids::generate_id;
pub use local_store::{FileStorage, LocalStore, MemoryStorage, StorageBackend, StorageKey};
pub use refresh::{spawn_refresh, RefreshHandle, RefreshSnapshot, DEFAULT_REFRESH_PERIOD};
pub use remote::RemoteClient;
