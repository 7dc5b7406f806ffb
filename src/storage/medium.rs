//! Storage Medium Module
//!
//! Synchronous flat key/value media that `PersistentStore` writes through.
//! Every operation is atomic; the media know nothing about namespaces or
//! expiry.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::{CacheError, Result};

// == Storage Medium ==
/// A durable, process-wide string key/value medium.
pub trait StorageMedium: Send + Sync + fmt::Debug {
    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// `StorageExhausted` if the write would exceed the medium's quota, in
    /// which case nothing is changed.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Reads the raw value under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Deletes `key`. Missing keys are not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Lists every key currently held.
    fn keys(&self) -> Result<Vec<String>>;
}

// == Items ==
/// Key/value map with byte accounting shared by the media.
#[derive(Debug, Default)]
struct Items {
    map: HashMap<String, String>,
    used_bytes: usize,
}

impl Items {
    fn from_map(map: HashMap<String, String>) -> Self {
        let used_bytes = map.iter().map(|(k, v)| k.len() + v.len()).sum();
        Self { map, used_bytes }
    }

    /// Inserts after checking the quota. Returns the replaced value.
    fn insert(&mut self, key: &str, value: &str, quota: Option<usize>) -> Result<Option<String>> {
        let freed = self.map.get(key).map_or(0, |old| key.len() + old.len());
        let needed = self.used_bytes - freed + key.len() + value.len();

        if let Some(quota) = quota {
            if needed > quota {
                return Err(CacheError::StorageExhausted(format!(
                    "Writing '{}' needs {} bytes, quota is {} bytes",
                    key, needed, quota
                )));
            }
        }

        self.used_bytes = needed;
        Ok(self.map.insert(key.to_string(), value.to_string()))
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.map.remove(key);
        if let Some(old) = &removed {
            self.used_bytes -= key.len() + old.len();
        }
        removed
    }

    /// Puts `key` back to `previous` after a failed write.
    fn restore(&mut self, key: &str, previous: Option<String>) {
        self.remove(key);
        if let Some(previous) = previous {
            self.used_bytes += key.len() + previous.len();
            self.map.insert(key.to_string(), previous);
        }
    }
}

fn lock(items: &Mutex<Items>) -> MutexGuard<'_, Items> {
    items.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Memory Medium ==
/// In-process medium, mostly for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    items: Mutex<Items>,
    quota: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that refuses writes beyond `quota_bytes` (keys plus values).
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::default(),
            quota: Some(quota_bytes),
        }
    }

    pub fn used_bytes(&self) -> usize {
        lock(&self.items).used_bytes
    }
}

impl StorageMedium for MemoryMedium {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.items).insert(key, value, self.quota).map(|_| ())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.items).map.get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        lock(&self.items).remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(lock(&self.items).map.keys().cloned().collect())
    }
}

// == File Medium ==
/// Medium persisted as one flat JSON object file.
///
/// The file is read once at open and rewritten after every mutation (via a
/// temporary file and rename), so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
    items: Mutex<Items>,
    quota: Option<usize>,
}

impl FileMedium {
    /// Opens (or starts) the medium at `path`.
    ///
    /// A missing file starts empty. A file that is not a JSON object of
    /// strings is logged and replaced on the next write.
    ///
    /// # Errors
    /// `Storage` if the file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let map = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<HashMap<String, String>>(&text) {
                Ok(map) => map,
                Err(err) => {
                    warn!("Storage file {} is corrupt, starting empty: {}", path.display(), err);
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(CacheError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    err
                )))
            }
        };

        debug!("Opened storage file {} with {} items", path.display(), map.len());
        Ok(Self {
            path,
            items: Mutex::new(Items::from_map(map)),
            quota,
        })
    }

    fn flush(&self, items: &Items) -> Result<()> {
        let sorted: BTreeMap<&String, &String> = items.map.iter().collect();
        let text = serde_json::to_string(&sorted)
            .map_err(|err| CacheError::Internal(format!("Failed to encode storage: {err}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|err| {
                CacheError::Storage(format!("Failed to write {}: {}", self.path.display(), err))
            })
    }
}

impl StorageMedium for FileMedium {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = lock(&self.items);
        let previous = items.insert(key, value, self.quota)?;
        if let Err(err) = self.flush(&items) {
            items.restore(key, previous);
            return Err(err);
        }
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.items).map.get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = lock(&self.items);
        let Some(previous) = items.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.flush(&items) {
            items.restore(key, Some(previous));
            return Err(err);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(lock(&self.items).map.keys().cloned().collect())
    }
}
