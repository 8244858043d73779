// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key-value persistence for the data-access layer.
//!
//! Each key holds one whole JSON document (a collection, the settings
//! record, the auth flag). There are no partial updates: callers read the
//! full value, change it in memory and write it back.
//!
//! Read failures (missing file, corrupt JSON) are logged and reported as
//! "no data". Write failures are returned to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::StoreError;
use crate::models::{DataSnapshot, Offer, Profile, Record, Settings};

const KEY_PREFIX: &str = "youthCouncil_";

/// Logical storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// One entity collection, named by `Record::COLLECTION`
    Collection(&'static str),
    Settings,
    AdminAuth,
    AdminToken,
}

impl StorageKey {
    pub fn of<T: Record>() -> Self {
        StorageKey::Collection(T::COLLECTION)
    }

    pub fn name(&self) -> String {
        let suffix = match self {
            StorageKey::Collection(collection) => collection,
            StorageKey::Settings => "settings",
            StorageKey::AdminAuth => "adminAuth",
            StorageKey::AdminToken => "adminToken",
        };
        format!("{}{}", KEY_PREFIX, suffix)
    }
}

/// Raw string storage underneath `LocalStore`.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Write-then-rename so a crash never leaves a half-written document.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Process-memory storage; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Typed JSON view over a `StorageBackend`.
///
/// Cloning is cheap and clones share the same backend.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn StorageBackend>,
    /// Serializes read-modify-write cycles on a collection.
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileStorage::new(dir))
    }

    /// Read and parse a value. Any failure is logged and reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let name = key.name();
        let raw = match self.backend.read(&name) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %name, error = %e, "Local storage read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                let e = StoreError::Json { key: name, source };
                tracing::warn!(error = %e, "Discarding unreadable local data");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<(), StoreError> {
        let name = key.name();
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Json {
            key: name.clone(),
            source,
        })?;
        self.backend.write(&name, &raw).inspect_err(|e| {
            tracing::error!(key = %name, error = %e, "Local storage write failed");
        })
    }

    pub fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
        self.backend.remove(&key.name())
    }

    // ─── Collections ─────────────────────────────────────────────

    /// Whole collection, or empty when nothing (readable) is stored.
    pub fn list<T: Record>(&self) -> Vec<T> {
        self.get(StorageKey::of::<T>()).unwrap_or_default()
    }

    pub fn find<T: Record>(&self, id: &str) -> Option<T> {
        self.list::<T>().into_iter().find(|item| item.id() == id)
    }

    pub fn replace<T: Record>(&self, items: &[T]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.set(StorageKey::of::<T>(), items)
    }

    /// Read-modify-write a collection under the store's write lock.
    ///
    /// The collection is written back only when `f` returns `Ok`.
    pub fn update<T, R, E>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R, E>) -> Result<R, E>
    where
        T: Record,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.list::<T>();
        let result = f(&mut items)?;
        self.set(StorageKey::of::<T>(), &items)?;
        Ok(result)
    }

    pub fn offers(&self) -> Vec<Offer> {
        self.list()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.list()
    }

    pub fn snapshot(&self) -> DataSnapshot {
        DataSnapshot {
            discounts: self.offers(),
            profiles: self.profiles(),
        }
    }

    pub fn replace_snapshot(&self, snapshot: &DataSnapshot) -> Result<(), StoreError> {
        self.replace(&snapshot.discounts)?;
        self.replace(&snapshot.profiles)
    }

    // ─── Settings & auth ─────────────────────────────────────────

    pub fn settings(&self) -> Option<Settings> {
        self.get(StorageKey::Settings)
    }

    pub fn set_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.set(StorageKey::Settings, settings)
    }

    /// Local "logged in" marker used when the API cannot vouch for a session.
    pub fn admin_auth(&self) -> bool {
        self.get(StorageKey::AdminAuth).unwrap_or(false)
    }

    pub fn set_admin_auth(&self, authenticated: bool) -> Result<(), StoreError> {
        self.set(StorageKey::AdminAuth, &authenticated)
    }

    pub fn admin_token(&self) -> Option<String> {
        self.get(StorageKey::AdminToken)
    }

    pub fn set_admin_token(&self, token: Option<&str>) -> Result<(), StoreError> {
        match token {
            Some(token) => self.set(StorageKey::AdminToken, token),
            None => self.remove(StorageKey::AdminToken),
        }
    }
}
